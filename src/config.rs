//! Configuration management for herakles-perf-collector.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use herakles_perf_collector::{AnomalyReporting, CollectorConfig, Family};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_ITERATIONS: usize = 1;

/// Enhanced configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Counter sources
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    // Measurement
    #[serde(alias = "interval-ms")]
    pub interval_ms: Option<u64>,
    pub iterations: Option<usize>,

    // Counter family flags
    #[serde(alias = "enable-cpu")]
    pub enable_cpu: Option<bool>,
    #[serde(alias = "enable-network-interface")]
    pub enable_network_interface: Option<bool>,
    #[serde(alias = "enable-tcp")]
    pub enable_tcp: Option<bool>,
    #[serde(alias = "skip-loopback")]
    pub skip_loopback: Option<bool>,

    /// "silent" | "log"
    #[serde(alias = "anomaly-reporting")]
    pub anomaly_reporting: Option<AnomalyReporting>,

    // Logging / output
    pub log_level: Option<String>,
    /// "yaml" | "json" | "toml"
    #[serde(alias = "output-format")]
    pub output_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            interval_ms: Some(DEFAULT_INTERVAL_MS),
            iterations: Some(DEFAULT_ITERATIONS),
            enable_cpu: Some(true),
            enable_network_interface: Some(true),
            enable_tcp: Some(true),
            skip_loopback: Some(false),
            anomaly_reporting: Some(AnomalyReporting::Silent),
            log_level: Some("info".into()),
            output_format: Some("yaml".into()),
        }
    }
}

impl Config {
    /// Counter families enabled for sampling, in report order.
    pub fn families(&self) -> Vec<Family> {
        let mut families = Vec::new();
        if self.enable_cpu.unwrap_or(true) {
            families.push(Family::Cpu);
        }
        if self.enable_network_interface.unwrap_or(true) {
            families.push(Family::NetworkInterface);
        }
        if self.enable_tcp.unwrap_or(true) {
            families.push(Family::Tcp);
        }
        families
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS))
    }

    pub fn iterations(&self) -> usize {
        self.iterations.unwrap_or(DEFAULT_ITERATIONS)
    }

    /// Effective log level; unknown names fall back to info.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(|level| LogLevel::from_str(level, true).ok())
            .unwrap_or(LogLevel::Info)
    }

    pub fn output_format(&self) -> ConfigFormat {
        match self.output_format.as_deref() {
            Some("json") => ConfigFormat::Json,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }

    /// Library settings derived from the effective config.
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            proc_root: self
                .proc_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT)),
            anomaly_reporting: self.anomaly_reporting.unwrap_or_default(),
            skip_loopback: self.skip_loopback.unwrap_or(false),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Family flags: at least one must be true
    if cfg.families().is_empty() {
        return Err(
            "At least one of enable_cpu/enable_network_interface/enable_tcp must be true".into(),
        );
    }

    if cfg.interval_ms == Some(0) {
        return Err("interval_ms must be greater than 0".into());
    }

    if cfg.iterations == Some(0) {
        return Err("iterations must be greater than 0".into());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!(
                "Invalid log_level '{}', expected off, error, warn, info, debug or trace",
                level
            )
            .into());
        }
    }

    if let Some(format) = cfg.output_format.as_deref() {
        if !matches!(format, "yaml" | "json" | "toml") {
            return Err(format!(
                "Invalid output_format '{}', expected 'yaml', 'json' or 'toml'",
                format
            )
            .into());
        }
    }

    cfg.collector_config().validate()?;
    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(level) = args.log_level {
        if let Some(value) = level.to_possible_value() {
            config.log_level = Some(value.get_name().to_string());
        }
    }
    if let Some(proc_root) = &args.proc_root {
        config.proc_root = Some(proc_root.clone());
    }
    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = Some(interval_ms);
    }
    if let Some(iterations) = args.iterations {
        config.iterations = Some(iterations);
    }

    // Family flags
    if args.disable_cpu {
        config.enable_cpu = Some(false);
    }
    if args.disable_network_interface {
        config.enable_network_interface = Some(false);
    }
    if args.disable_tcp {
        config.enable_tcp = Some(false);
    }
    if args.skip_loopback {
        config.skip_loopback = Some(true);
    }
    if args.report_anomalies {
        config.anomaly_reporting = Some(AnomalyReporting::Log);
    }

    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/herakles/perf-collector.yaml",
            "/etc/herakles/perf-collector.yml",
            "/etc/herakles/perf-collector.json",
            "./herakles-perf-collector.yaml",
            "./herakles-perf-collector.yml",
            "./herakles-perf-collector.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_default()
    };

    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Renders a serializable value in the requested format.
pub fn render<T: Serialize>(
    value: &T,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(value)?,
        ConfigFormat::Toml => toml::to_string_pretty(value)?,
        ConfigFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render(config, &format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_effective_config(&config).is_ok());
        assert_eq!(
            config.families(),
            vec![Family::Cpu, Family::NetworkInterface, Family::Tcp]
        );
        assert_eq!(config.interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_all_families_disabled_is_invalid() {
        let config = Config {
            enable_cpu: Some(false),
            enable_network_interface: Some(false),
            enable_tcp: Some(false),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn test_zero_interval_is_invalid() {
        let config = Config {
            interval_ms: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn test_bad_output_format_is_invalid() {
        let config = Config {
            output_format: Some("xml".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("collector.yaml");
        fs::write(
            &path,
            "interval_ms: 250\niterations: 4\nenable_tcp: false\nanomaly_reporting: silent\n",
        )
        .unwrap();

        let args = Args::parse_from([
            "herakles-perf-collector",
            "--config",
            path.to_str().unwrap(),
            "--interval-ms",
            "500",
            "--report-anomalies",
        ]);
        let config = resolve_config(&args).unwrap();

        assert_eq!(config.interval_ms, Some(500));
        assert_eq!(config.iterations, Some(4));
        assert_eq!(config.families(), vec![Family::Cpu, Family::NetworkInterface]);
        assert_eq!(config.anomaly_reporting, Some(AnomalyReporting::Log));
    }

    #[test]
    fn test_toml_config_with_aliases() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("collector.toml");
        fs::write(&path, "proc-root = \"/host/proc\"\nskip-loopback = true\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        let collector = config.collector_config();
        assert_eq!(collector.proc_root, PathBuf::from("/host/proc"));
        assert!(collector.skip_loopback);
    }

    #[test]
    fn test_log_level_from_file_unless_cli_sets_it() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("collector.yaml");
        fs::write(&path, "log_level: debug\n").unwrap();

        let args = Args::parse_from(["herakles-perf-collector", "--config", path.to_str().unwrap()]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.log_level(), LogLevel::Debug);

        let args = Args::parse_from([
            "herakles-perf-collector",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "warn",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.log_level(), LogLevel::Warn);
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_bad_log_level_is_invalid() {
        let config = Config {
            log_level: Some("loud".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn test_no_config_uses_defaults() {
        let args = Args::parse_from(["herakles-perf-collector", "--no-config", "--disable-cpu"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.families(), vec![Family::NetworkInterface, Family::Tcp]);
        assert_eq!(config.iterations(), DEFAULT_ITERATIONS);
    }
}
