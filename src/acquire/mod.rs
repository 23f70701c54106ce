//! Counter acquisition.
//!
//! The collector depends on [`CounterAcquirer`] only; each platform provides
//! its own implementation. Acquirers must leave a slot untouched when they
//! fail, so every implementation reads and parses first and writes last.

pub mod null;
pub mod procfs;

pub use null::NullAcquirer;
pub use procfs::ProcfsAcquirer;

use crate::collector_config::CollectorConfig;
use crate::counters::{CpuTable, NiTable, Slot, TcpTable};
use crate::error::AcquireError;

/// Fills one snapshot slot of a counter family from live OS state.
pub trait CounterAcquirer: Send {
    /// Fills `[*][*][slot]` for every processor and CPU stat kind.
    fn acquire_cpu(&self, table: &mut CpuTable, slot: Slot) -> Result<(), AcquireError>;

    /// Fills `[*][*][slot]` for every interface currently present.
    fn acquire_network_interface(&self, table: &mut NiTable, slot: Slot)
        -> Result<(), AcquireError>;

    /// Fills `[*][slot]` for every TCP stat kind.
    fn acquire_tcp(&self, table: &mut TcpTable, slot: Slot) -> Result<(), AcquireError>;
}

/// Acquirer for the platform this binary was built for.
pub fn platform_default(config: &CollectorConfig) -> Box<dyn CounterAcquirer> {
    #[cfg(target_os = "linux")]
    {
        Box::new(ProcfsAcquirer::new(config.proc_root.clone()).skip_loopback(config.skip_loopback))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = config;
        tracing::warn!("No counter source for this platform, statistics will read as zero");
        Box::new(NullAcquirer)
    }
}
