//! Delta-statistics engine.
//!
//! Converts the first and last snapshot of a counter family into normalized
//! statistics. `time_diff` is the elapsed time between the snapshots in clock
//! ticks; tick-based counters divided by it give a fraction of one
//! processor, event counters scaled by the tick rate give events per second.
//!
//! Counter anomalies (negative deltas from resets or wraparound, utilization
//! above 100%) are clamped into range and counted, never treated as errors.

use tracing::warn;

use crate::collector_config::AnomalyReporting;
use crate::counters::{
    CpuStat, CpuTable, NiStat, NiTable, Slot, TcpStat, TcpTable, CPU_STATS, NI_STATS, TCP_STATS,
};
use crate::error::{CollectorError, Result};
use crate::results::{CpuResults, NiResults, TcpResults};

/// Time base shared by every computation of one window.
#[derive(Debug, Clone, Copy)]
pub struct TimeBase {
    pub time_diff: f64,
    pub clock_tick_rate: f64,
}

impl TimeBase {
    pub fn new(time_diff: f64, clock_tick_rate: f64) -> Result<Self> {
        if !(time_diff.is_finite() && time_diff > 0.0) {
            return Err(CollectorError::PreconditionViolation(format!(
                "elapsed time between snapshots must be positive, got {time_diff} ticks"
            )));
        }
        if !(clock_tick_rate.is_finite() && clock_tick_rate > 0.0) {
            return Err(CollectorError::PreconditionViolation(format!(
                "clock tick rate must be positive, got {clock_tick_rate}"
            )));
        }
        Ok(Self {
            time_diff,
            clock_tick_rate,
        })
    }

    /// Events per second for a raw event delta.
    fn rate(&self, delta: f64) -> f64 {
        delta * self.clock_tick_rate / self.time_diff
    }
}

/// Clamps a utilization fraction to `[0, 1]`; the flag is set when clamped.
pub fn clamp_fraction(fraction: f64) -> (f64, bool) {
    if fraction < 0.0 {
        (0.0, true)
    } else if fraction > 1.0 {
        (1.0, true)
    } else {
        (fraction, false)
    }
}

/// Clamps a rate to be non-negative; the flag is set when clamped.
pub fn clamp_rate(rate: f64) -> (f64, bool) {
    if rate < 0.0 {
        (0.0, true)
    } else {
        (rate, false)
    }
}

fn delta(first: u64, last: u64) -> f64 {
    last as f64 - first as f64
}

/// Per-processor utilization percentages and interrupt rates.
pub fn cpu_stats(table: &CpuTable, base: TimeBase, reporting: AnomalyReporting) -> CpuResults {
    let count = table.processor_count();
    let mut utilization = Vec::with_capacity(count);
    let mut clamped = 0;

    for cpu in 0..count {
        let mut row = [0.0; CPU_STATS];
        for stat in CpuStat::ALL {
            let first = table.get(cpu, stat, Slot::First).unwrap_or(0);
            let last = table.get(cpu, stat, Slot::Last).unwrap_or(0);
            let raw_delta = delta(first, last);

            let (value, was_clamped) = if stat.is_utilization() {
                let (fraction, was_clamped) = clamp_fraction(raw_delta / base.time_diff);
                (fraction * 100.0, was_clamped)
            } else {
                clamp_rate(base.rate(raw_delta))
            };

            if was_clamped {
                clamped += 1;
                if reporting == AnomalyReporting::Log {
                    warn!(
                        cpu,
                        stat = stat.name(),
                        raw_delta,
                        time_diff = base.time_diff,
                        "CPU counter outside valid range, clamped"
                    );
                }
            }
            row[stat.index()] = value;
        }
        utilization.push(row);
    }

    CpuResults {
        count,
        utilization,
        clamped,
    }
}

/// Per-interface event rates.
///
/// An interface missing from either snapshot gets zero rates and counts as
/// clamped.
pub fn ni_stats(table: &NiTable, base: TimeBase, reporting: AnomalyReporting) -> NiResults {
    let ni_count = table.len();
    let mut ni_stats = Vec::with_capacity(ni_count);
    let mut clamped = 0;

    for (net, name) in table.names().iter().enumerate() {
        let mut row = [0.0; NI_STATS];
        for stat in NiStat::ALL {
            let first = table.get(net, stat, Slot::First);
            let last = table.get(net, stat, Slot::Last);

            let (value, was_clamped) = match (first, last) {
                (Some(first), Some(last)) => clamp_rate(base.rate(delta(first, last))),
                _ => (0.0, true),
            };

            if was_clamped {
                clamped += 1;
                if reporting == AnomalyReporting::Log {
                    warn!(
                        interface = name.as_str(),
                        stat = stat.name(),
                        present_in_both = first.is_some() && last.is_some(),
                        "Network interface counter reset or interface changed, clamped to 0"
                    );
                }
            }
            row[stat.index()] = value;
        }
        ni_stats.push(row);
    }

    NiResults {
        ni_count,
        names: table.names().to_vec(),
        ni_stats,
        clamped,
    }
}

/// System-wide TCP event rates.
pub fn tcp_stats(table: &TcpTable, base: TimeBase, reporting: AnomalyReporting) -> TcpResults {
    let mut tcp_stats = [0.0; TCP_STATS];
    let mut clamped = 0;

    for stat in TcpStat::ALL {
        let raw_delta = delta(table.get(stat, Slot::First), table.get(stat, Slot::Last));
        let (value, was_clamped) = clamp_rate(base.rate(raw_delta));
        if was_clamped {
            clamped += 1;
            if reporting == AnomalyReporting::Log {
                warn!(stat = stat.name(), raw_delta, "TCP counter reset, clamped to 0");
            }
        }
        tcp_stats[stat.index()] = value;
    }

    TcpResults { tcp_stats, clamped }
}
