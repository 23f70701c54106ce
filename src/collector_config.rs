//! Library-level collector configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CollectorError, Result};

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// How clamped counter anomalies are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReporting {
    /// Clamp and count only.
    #[default]
    Silent,
    /// Clamp, count, and emit a warning per clamped value.
    Log,
}

/// Settings consumed by [`crate::Collector`] and the procfs acquirer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Root of the proc filesystem (overridable for containers and fixtures).
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    #[serde(default)]
    pub anomaly_reporting: AnomalyReporting,

    /// Leave the loopback interface out of network interface statistics.
    #[serde(default)]
    pub skip_loopback: bool,
}

fn default_proc_root() -> PathBuf {
    PathBuf::from(DEFAULT_PROC_ROOT)
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
            anomaly_reporting: AnomalyReporting::default(),
            skip_loopback: false,
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.proc_root.as_os_str().is_empty() {
            return Err(CollectorError::Config("proc_root must not be empty".into()));
        }
        Ok(())
    }
}
