//! Derived statistics returned to callers.
//!
//! Results are plain values: the collector builds them per compute call and
//! hands ownership to the caller.

use serde::Serialize;

use crate::counters::{CpuStat, NiStat, TcpStat, CPU_STATS, NI_STATS, TCP_STATS};

/// Per-processor statistics, `utilization[cpu][stat]`.
///
/// Utilization kinds are percentages in `[0, 100]`; the interrupt kind is
/// interrupts per second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuResults {
    pub count: usize,
    pub utilization: Vec<[f64; CPU_STATS]>,
    /// Values clamped because of counter anomalies.
    pub clamped: usize,
}

impl CpuResults {
    pub fn get(&self, cpu: usize, stat: CpuStat) -> Option<f64> {
        self.utilization.get(cpu).map(|row| row[stat.index()])
    }
}

/// Per-interface rates, `ni_stats[interface][stat]`, in events per second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NiResults {
    pub ni_count: usize,
    pub names: Vec<String>,
    pub ni_stats: Vec<[f64; NI_STATS]>,
    pub clamped: usize,
}

impl NiResults {
    pub fn get(&self, interface: usize, stat: NiStat) -> Option<f64> {
        self.ni_stats.get(interface).map(|row| row[stat.index()])
    }

    /// Looks up an interface by name.
    pub fn by_name(&self, name: &str, stat: NiStat) -> Option<f64> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.get(idx, stat)
    }

    pub fn is_empty(&self) -> bool {
        self.ni_count == 0
    }
}

/// System-wide TCP rates, in events per second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TcpResults {
    pub tcp_stats: [f64; TCP_STATS],
    pub clamped: usize,
}

impl TcpResults {
    pub fn get(&self, stat: TcpStat) -> f64 {
        self.tcp_stats[stat.index()]
    }
}

/// Network statistics: interfaces and TCP together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetResults {
    pub ni: NiResults,
    pub tcp: TcpResults,
}

/// Result of a family-dispatched compute call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FamilyResults {
    Cpu(CpuResults),
    NetworkInterface(NiResults),
    Tcp(TcpResults),
}
