//! Discover command implementation.

use herakles_perf_collector::{Family, HardwareInfo, Slot};
use serde::Serialize;

use crate::cli::ConfigFormat;
use crate::commands::open_collector;
use crate::config::{render, Config};

#[derive(Debug, Serialize)]
struct DiscoveryReport {
    #[serde(flatten)]
    hardware: HardwareInfo,
    network_interface_count: usize,
}

/// Prints discovered hardware facts and the current interface count.
pub fn command_discover(
    config: &Config,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut collector = open_collector(config)?;

    // The interface set is only known after a snapshot
    collector.take_snapshot(Family::NetworkInterface, Slot::First)?;

    let report = DiscoveryReport {
        hardware: collector.hardware().clone(),
        network_interface_count: collector.network_interface_count(),
    };
    println!("{}", render(&report, &format)?);
    Ok(())
}
