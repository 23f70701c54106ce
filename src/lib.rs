//! Herakles Performance Collector Library
//!
//! Snapshot-based performance counters for benchmarking on Linux. The
//! collector reads raw OS counters at the start and end of a measurement
//! window and derives normalized statistics from the deltas.
//!
//! # Features
//!
//! - **CPU**: per-processor user, privileged and total utilization (percent)
//!   plus interrupts per second
//! - **Network interfaces**: per-interface packet and error rates
//! - **TCP**: retransmitted segments per second
//! - **Counter anomalies**: resets and over-range values are clamped and counted
//! - **Targets**: disk and TCP endpoint enumeration for benchmark setup
//!
//! # Usage
//!
//! ```rust,no_run
//! use herakles_perf_collector::{Collector, CollectorConfig, CpuStat, Family, Slot};
//! use std::time::Duration;
//!
//! let mut collector = Collector::from_config(&CollectorConfig::default())?;
//!
//! collector.take_snapshot(Family::Cpu, Slot::First)?;
//! std::thread::sleep(Duration::from_secs(1));
//! collector.take_snapshot(Family::Cpu, Slot::Last)?;
//!
//! let cpu = collector.compute_cpu_stats()?;
//! for cpu_id in 0..cpu.count {
//!     println!("cpu{}: {:.1}%", cpu_id, cpu.get(cpu_id, CpuStat::Total).unwrap_or(0.0));
//! }
//! # Ok::<(), herakles_perf_collector::CollectorError>(())
//! ```

pub mod acquire;
pub mod clock;
pub mod collector;
pub mod collector_config;
pub mod counters;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod results;
pub mod store;
pub mod targets;

// Re-export main types for convenience
pub use acquire::{CounterAcquirer, NullAcquirer, ProcfsAcquirer};
pub use clock::{ManualClock, MonotonicClock, SampleClock};
pub use collector::Collector;
pub use collector_config::{AnomalyReporting, CollectorConfig};
pub use counters::{CpuStat, Family, InterfaceReading, NiStat, Slot, TcpStat};
pub use discovery::{FixedProbe, HardwareInfo, HardwareProbe, SysconfProbe};
pub use error::{AcquireError, CollectorError};
pub use results::{CpuResults, FamilyResults, NetResults, NiResults, TcpResults};
pub use store::SnapshotPhase;
pub use targets::{DiskTarget, EndpointRole, TcpEndpoint};
