//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use herakles_perf_collector::counters::{CpuTable, NiTable, TcpTable, CPU_STATS, NI_STATS};
use herakles_perf_collector::{
    AcquireError, Collector, CollectorConfig, CounterAcquirer, CpuStat, FixedProbe,
    InterfaceReading, ManualClock, Slot, TcpStat,
};

/// Counter values the next acquisition will report.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// `[cpu][stat]` values.
    pub cpu: Vec<[u64; CPU_STATS]>,
    pub interfaces: Vec<(String, [u64; NI_STATS])>,
    pub retrans_segs: u64,
    /// Fail every acquisition while set.
    pub fail: bool,
}

/// Acquirer that replays whatever the test put into the shared script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAcquirer {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedAcquirer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, f: impl FnOnce(&mut Script)) {
        let mut script = self.script.lock().unwrap();
        f(&mut script);
    }

    fn failure() -> AcquireError {
        AcquireError::Format {
            path: "scripted".into(),
            detail: "scripted failure".into(),
        }
    }
}

impl CounterAcquirer for ScriptedAcquirer {
    fn acquire_cpu(&self, table: &mut CpuTable, slot: Slot) -> Result<(), AcquireError> {
        let script = self.script.lock().unwrap();
        if script.fail {
            return Err(Self::failure());
        }
        for (cpu, values) in script.cpu.iter().enumerate() {
            for stat in CpuStat::ALL {
                table.set(cpu, stat, slot, values[stat.index()]);
            }
        }
        Ok(())
    }

    fn acquire_network_interface(
        &self,
        table: &mut NiTable,
        slot: Slot,
    ) -> Result<(), AcquireError> {
        let script = self.script.lock().unwrap();
        if script.fail {
            return Err(Self::failure());
        }
        let readings = script
            .interfaces
            .iter()
            .map(|(name, values)| InterfaceReading::new(name.clone(), *values))
            .collect();
        table.write_slot(slot, readings);
        Ok(())
    }

    fn acquire_tcp(&self, table: &mut TcpTable, slot: Slot) -> Result<(), AcquireError> {
        let script = self.script.lock().unwrap();
        if script.fail {
            return Err(Self::failure());
        }
        table.set(TcpStat::SegmentsResent, slot, script.retrans_segs);
        Ok(())
    }
}

/// Collector over a scripted acquirer and a manual clock, 100 ticks/s.
pub fn scripted_collector(processors: usize) -> (Collector, ScriptedAcquirer, ManualClock) {
    let acquirer = ScriptedAcquirer::new();
    acquirer.update(|s| s.cpu = vec![[0; CPU_STATS]; processors]);
    let clock = ManualClock::new(0.0);
    let collector = Collector::with_clock(
        CollectorConfig::default(),
        &FixedProbe::new(processors, 100.0),
        Box::new(acquirer.clone()),
        Box::new(clock.clone()),
    )
    .expect("collector construction");
    (collector, acquirer, clock)
}
