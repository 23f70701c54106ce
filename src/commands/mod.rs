//! CLI command implementations for herakles-perf-collector.
//!
//! This module provides implementations for all CLI subcommands:
//! - `sample`: Measurement windows and statistics output
//! - `discover`: Hardware discovery report
//! - `targets`: Disk and TCP endpoint enumeration
//! - `check`: System validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod discover;
pub mod sample;
pub mod targets;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use discover::command_discover;
pub use sample::command_sample;
pub use targets::command_targets;

use herakles_perf_collector::{Collector, CollectorError};
use tracing::error;

use crate::config::Config;

/// Builds the platform collector.
///
/// An unsupported platform ends the process with exit code 1; other errors
/// are returned to the caller.
pub fn open_collector(config: &Config) -> Result<Collector, Box<dyn std::error::Error>> {
    match Collector::from_config(&config.collector_config()) {
        Ok(collector) => Ok(collector),
        Err(e @ CollectorError::PlatformUnsupported(_)) => {
            error!("❌ {}", e);
            eprintln!(
                "*** Unable to initialize needed performance data.\n\
                 This error may indicate that you are trying to run\n\
                 on an unsupported processor or OS."
            );
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
