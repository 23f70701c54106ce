//! Sample command implementation.
//!
//! Runs measurement windows and prints the derived statistics.

use chrono::{DateTime, Utc};
use herakles_perf_collector::{
    Collector, CpuResults, CpuStat, Family, NiResults, NiStat, TcpResults, TcpStat,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::ConfigFormat;
use crate::commands::open_collector;
use crate::config::{render, Config};

/// One processor's statistics.
#[derive(Debug, Serialize)]
struct CpuRow {
    cpu: usize,
    user_percent: f64,
    privileged_percent: f64,
    total_percent: f64,
    interrupts_per_sec: f64,
}

/// One interface's statistics.
#[derive(Debug, Serialize)]
struct InterfaceRow {
    name: String,
    in_errors_per_sec: f64,
    out_errors_per_sec: f64,
    packets_per_sec: f64,
}

#[derive(Debug, Serialize)]
struct TcpRow {
    segments_resent_per_sec: f64,
}

/// Report of one measurement window. Scalars precede tables for TOML output.
#[derive(Debug, Serialize)]
struct SampleReport {
    iteration: usize,
    collected_at: DateTime<Utc>,
    elapsed_ms: f64,
    processor_count: usize,
    network_interface_count: usize,
    clamped: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cpu: Vec<CpuRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    interfaces: Vec<InterfaceRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tcp: Option<TcpRow>,
}

fn cpu_rows(results: &CpuResults) -> Vec<CpuRow> {
    (0..results.count)
        .map(|cpu| CpuRow {
            cpu,
            user_percent: results.get(cpu, CpuStat::User).unwrap_or(0.0),
            privileged_percent: results.get(cpu, CpuStat::Privileged).unwrap_or(0.0),
            total_percent: results.get(cpu, CpuStat::Total).unwrap_or(0.0),
            interrupts_per_sec: results.get(cpu, CpuStat::Irq).unwrap_or(0.0),
        })
        .collect()
}

fn interface_rows(results: &NiResults) -> Vec<InterfaceRow> {
    results
        .names
        .iter()
        .enumerate()
        .map(|(idx, name)| InterfaceRow {
            name: name.clone(),
            in_errors_per_sec: results.get(idx, NiStat::InErrors).unwrap_or(0.0),
            out_errors_per_sec: results.get(idx, NiStat::OutErrors).unwrap_or(0.0),
            packets_per_sec: results.get(idx, NiStat::Packets).unwrap_or(0.0),
        })
        .collect()
}

fn tcp_row(results: &TcpResults) -> TcpRow {
    TcpRow {
        segments_resent_per_sec: results.get(TcpStat::SegmentsResent),
    }
}

/// Computes the statistics of every sampled family.
fn build_report(
    collector: &Collector,
    families: &[Family],
    iteration: usize,
) -> Result<SampleReport, Box<dyn std::error::Error>> {
    let mut report = SampleReport {
        iteration,
        collected_at: Utc::now(),
        elapsed_ms: 0.0,
        processor_count: collector.processor_count(),
        network_interface_count: collector.network_interface_count(),
        clamped: 0,
        cpu: Vec::new(),
        interfaces: Vec::new(),
        tcp: None,
    };

    if let Some(time_diff) = families.first().and_then(|&f| collector.time_diff(f)) {
        report.elapsed_ms = time_diff / collector.clock_tick_rate() * 1000.0;
    }

    for &family in families {
        match family {
            Family::Cpu => {
                let results = collector.compute_cpu_stats()?;
                report.clamped += results.clamped;
                report.cpu = cpu_rows(&results);
            }
            Family::NetworkInterface => {
                let results = collector.compute_ni_stats()?;
                report.clamped += results.clamped;
                report.interfaces = interface_rows(&results);
            }
            Family::Tcp => {
                let results = collector.compute_tcp_stats()?;
                report.clamped += results.clamped;
                report.tcp = Some(tcp_row(&results));
            }
        }
    }

    Ok(report)
}

/// Runs the configured measurement windows.
pub fn command_sample(
    config: &Config,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut collector = open_collector(config)?;
    let families = config.families();
    let iterations = config.iterations();
    let interval = config.interval();

    info!(
        "Sampling {:?} for {} window(s) of {}ms",
        families,
        iterations,
        interval.as_millis()
    );

    for iteration in 1..=iterations {
        collector.measure(&families, interval)?;
        let report = build_report(&collector, &families, iteration)?;
        debug!(iteration, clamped = report.clamped, "Window complete");

        if matches!(format, ConfigFormat::Yaml) && iteration > 1 {
            println!("---");
        }
        println!("{}", render(&report, &format)?);
    }

    Ok(())
}
