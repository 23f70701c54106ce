//! Targets command implementation.
//!
//! Lists the disks and TCP endpoints a benchmark can drive.

use herakles_perf_collector::targets::{enumerate_disks, enumerate_tcp_endpoints};
use herakles_perf_collector::{DiskTarget, TcpEndpoint};
use serde::Serialize;

use crate::cli::ConfigFormat;
use crate::config::{render, Config};

#[derive(Debug, Default, Serialize)]
struct TargetsReport {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    disks: Vec<DiskTarget>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tcp_endpoints: Vec<TcpEndpoint>,
}

/// Lists disk and TCP endpoint targets. With neither flag set both are listed.
pub fn command_targets(
    disks: bool,
    tcp: bool,
    config: &Config,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let collector_config = config.collector_config();
    let both = !disks && !tcp;
    let mut report = TargetsReport::default();

    if disks || both {
        report.disks = enumerate_disks(&collector_config.proc_root)?;
    }
    if tcp || both {
        report.tcp_endpoints = enumerate_tcp_endpoints(collector_config.skip_loopback)?;
    }

    if report.disks.is_empty() && report.tcp_endpoints.is_empty() {
        println!("⚠️  No targets found");
        return Ok(());
    }

    println!("{}", render(&report, &format)?);
    Ok(())
}
