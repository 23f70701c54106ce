//! Dual-snapshot performance collector.
//!
//! A [`Collector`] exists only after hardware discovery succeeded. Each
//! counter family runs its own measurement window:
//!
//! ```text
//! Ready --take(First)--> SnapshotPending --take(Last)--> SnapshotsComplete
//!                              ^                               |
//!                              +---------take(First)-----------+
//! ```
//!
//! Statistics are available in `SnapshotsComplete` only. Callers sharing a
//! collector across threads must serialize access (e.g. one `Mutex` per
//! collector); the collector holds no locks itself.

use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::acquire::{self, CounterAcquirer};
use crate::clock::{MonotonicClock, SampleClock};
use crate::collector_config::CollectorConfig;
use crate::counters::{Family, Slot};
use crate::discovery::{self, HardwareInfo, HardwareProbe, SysconfProbe};
use crate::engine::{self, TimeBase};
use crate::error::{CollectorError, Result};
use crate::results::{CpuResults, FamilyResults, NetResults, NiResults, TcpResults};
use crate::store::{SnapshotPhase, SnapshotStore};

pub struct Collector {
    hardware: HardwareInfo,
    config: CollectorConfig,
    acquirer: Box<dyn CounterAcquirer>,
    clock: Box<dyn SampleClock>,
    store: SnapshotStore,
}

impl Collector {
    /// Runs discovery and builds a collector timed by the monotonic clock.
    pub fn new(
        config: CollectorConfig,
        probe: &dyn HardwareProbe,
        acquirer: Box<dyn CounterAcquirer>,
    ) -> Result<Self> {
        config.validate()?;
        let hardware = discovery::discover(probe)?;
        let clock = Box::new(MonotonicClock::new(hardware.clock_tick_rate));
        Ok(Self::assemble(hardware, config, acquirer, clock))
    }

    /// Like [`Collector::new`], with an explicit sample clock.
    pub fn with_clock(
        config: CollectorConfig,
        probe: &dyn HardwareProbe,
        acquirer: Box<dyn CounterAcquirer>,
        clock: Box<dyn SampleClock>,
    ) -> Result<Self> {
        config.validate()?;
        let hardware = discovery::discover(probe)?;
        Ok(Self::assemble(hardware, config, acquirer, clock))
    }

    /// Builds a collector with the platform's probe and acquirer.
    pub fn from_config(config: &CollectorConfig) -> Result<Self> {
        let probe = SysconfProbe::new(config.proc_root.clone());
        let acquirer = acquire::platform_default(config);
        Self::new(config.clone(), &probe, acquirer)
    }

    fn assemble(
        hardware: HardwareInfo,
        config: CollectorConfig,
        acquirer: Box<dyn CounterAcquirer>,
        clock: Box<dyn SampleClock>,
    ) -> Self {
        info!(
            processors = hardware.processor_count,
            proc_root = %config.proc_root.display(),
            "Performance collector initialized"
        );
        Self {
            store: SnapshotStore::new(hardware.processor_count),
            hardware,
            config,
            acquirer,
            clock,
        }
    }

    pub fn hardware(&self) -> &HardwareInfo {
        &self.hardware
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn processor_count(&self) -> usize {
        self.hardware.processor_count
    }

    pub fn clock_tick_rate(&self) -> f64 {
        self.hardware.clock_tick_rate
    }

    /// Interfaces seen by the latest network interface acquisition (0 before any).
    pub fn network_interface_count(&self) -> usize {
        self.store.ni.len()
    }

    pub fn phase(&self, family: Family) -> SnapshotPhase {
        self.store.window(family).phase()
    }

    /// Elapsed ticks of `family`'s window once both snapshots exist.
    pub fn time_diff(&self, family: Family) -> Option<f64> {
        self.store.window(family).time_diff()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Takes snapshot `slot` of `family`.
    ///
    /// Overwrites that slot's raw data and timestamp; the other slot is left
    /// alone. On acquisition failure nothing is recorded.
    pub fn take_snapshot(&mut self, family: Family, slot: Slot) -> Result<()> {
        let ticks = self.clock.now_ticks();

        let acquired = match family {
            Family::Cpu => self.acquirer.acquire_cpu(&mut self.store.cpu, slot),
            Family::NetworkInterface => self
                .acquirer
                .acquire_network_interface(&mut self.store.ni, slot),
            Family::Tcp => self.acquirer.acquire_tcp(&mut self.store.tcp, slot),
        };
        acquired.map_err(|source| CollectorError::Acquisition { family, source })?;

        self.store.window_mut(family).record(slot, ticks);
        debug!(%family, %slot, ticks, "Snapshot taken");
        Ok(())
    }

    /// Takes `slot` for each family in order.
    pub fn take_snapshots(&mut self, families: &[Family], slot: Slot) -> Result<()> {
        for &family in families {
            self.take_snapshot(family, slot)?;
        }
        Ok(())
    }

    /// Runs one full measurement window: first snapshots, sleep, last snapshots.
    pub fn measure(&mut self, families: &[Family], interval: Duration) -> Result<()> {
        self.take_snapshots(families, Slot::First)?;
        thread::sleep(interval);
        self.take_snapshots(families, Slot::Last)
    }

    fn time_base(&self, family: Family) -> Result<TimeBase> {
        let time_diff = self.store.ready_time_diff(family)?;
        TimeBase::new(time_diff, self.hardware.clock_tick_rate)
    }

    pub fn compute_cpu_stats(&self) -> Result<CpuResults> {
        let base = self.time_base(Family::Cpu)?;
        Ok(engine::cpu_stats(
            &self.store.cpu,
            base,
            self.config.anomaly_reporting,
        ))
    }

    pub fn compute_ni_stats(&self) -> Result<NiResults> {
        let base = self.time_base(Family::NetworkInterface)?;
        Ok(engine::ni_stats(
            &self.store.ni,
            base,
            self.config.anomaly_reporting,
        ))
    }

    pub fn compute_tcp_stats(&self) -> Result<TcpResults> {
        let base = self.time_base(Family::Tcp)?;
        Ok(engine::tcp_stats(
            &self.store.tcp,
            base,
            self.config.anomaly_reporting,
        ))
    }

    /// Interface and TCP statistics together; both windows must be complete.
    pub fn compute_net_stats(&self) -> Result<NetResults> {
        Ok(NetResults {
            ni: self.compute_ni_stats()?,
            tcp: self.compute_tcp_stats()?,
        })
    }

    pub fn compute_stats(&self, family: Family) -> Result<FamilyResults> {
        match family {
            Family::Cpu => self.compute_cpu_stats().map(FamilyResults::Cpu),
            Family::NetworkInterface => self.compute_ni_stats().map(FamilyResults::NetworkInterface),
            Family::Tcp => self.compute_tcp_stats().map(FamilyResults::Tcp),
        }
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("hardware", &self.hardware)
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
