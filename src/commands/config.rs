//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("herakles-perf-collector.yaml"),
    };

    let mut content = render(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Performance Collector Configuration
# ============================================
#
# Counter Sources
# ---------------
# proc_root: "/proc"           # Root of the proc filesystem (e.g. /host/proc in containers)
#
# Measurement
# -----------
# interval_ms: 1000            # Time between first and last snapshot
# iterations: 1                # Number of measurement windows
#
# Counter Families
# ----------------
# enable_cpu: true             # Per-CPU utilization and interrupt rates
# enable_network_interface: true # Per-interface packet and error rates
# enable_tcp: true             # TCP retransmitted segments per second
# skip_loopback: false         # Leave "lo" out of interface statistics
#
# Counter Anomalies
# -----------------
# anomaly_reporting: "silent"  # "silent" = clamp and count, "log" = also warn per value
#
# Logging / Output
# ----------------
# log_level: "info"            # off, error, warn, info, debug, trace
# output_format: "yaml"        # yaml, json, toml
"#;

    format!("{comments}\n{yaml}")
}
