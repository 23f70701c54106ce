//! CLI arguments and subcommands for herakles-perf-collector.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-perf-collector",
    about = "Snapshot-based CPU, network interface and TCP performance counters",
    long_about = "Snapshot-based CPU, network interface and TCP performance counters.\n\n\
                  Takes a first and a last snapshot of the kernel's raw counters around a \
                  measurement interval and reports per-CPU utilization, interrupt rates, \
                  per-interface packet/error rates and TCP retransmission rates.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/herakles-perf-collector - More info: https://www.herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (overrides log_level from the config file, default info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Root of the proc filesystem
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Measurement window length in milliseconds
    #[arg(short = 'i', long)]
    pub interval_ms: Option<u64>,

    /// Number of measurement windows
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Skip CPU statistics
    #[arg(long)]
    pub disable_cpu: bool,

    /// Skip network interface statistics
    #[arg(long)]
    pub disable_network_interface: bool,

    /// Skip TCP statistics
    #[arg(long)]
    pub disable_tcp: bool,

    /// Leave the loopback interface out
    #[arg(long)]
    pub skip_loopback: bool,

    /// Log every clamped counter anomaly
    #[arg(long)]
    pub report_anomalies: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run measurement windows and print statistics (default)
    Sample {
        /// Output format
        #[arg(long, value_enum)]
        format: Option<ConfigFormat>,
    },

    /// Print discovered hardware information
    Discover,

    /// List disk and TCP endpoint targets
    Targets {
        /// List disks only
        #[arg(long, conflicts_with = "tcp")]
        disks: bool,

        /// List TCP endpoints only
        #[arg(long)]
        tcp: bool,
    },

    /// Check runtime requirements and permissions
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
