//! One-time hardware discovery.
//!
//! Establishes the processor count and the clock tick rate the collector
//! needs to size its tables and normalize deltas. Both are mandatory; the
//! processor clock speed is informational only.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CollectorError, Result};

/// Source of hardware facts.
pub trait HardwareProbe {
    /// Number of online processors.
    fn processor_count(&self) -> Option<usize>;

    /// Clock ticks per second used by the tick-based counters.
    fn clock_tick_rate(&self) -> Option<f64>;

    /// Processor clock speed in Hz, if known.
    fn processor_speed_hz(&self) -> Option<f64> {
        None
    }
}

/// Hardware facts established at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareInfo {
    pub processor_count: usize,
    pub clock_tick_rate: f64,
    pub processor_speed_hz: Option<f64>,
}

/// Runs discovery, failing when a mandatory value cannot be determined.
pub fn discover(probe: &dyn HardwareProbe) -> Result<HardwareInfo> {
    let processor_count = probe
        .processor_count()
        .filter(|&count| count > 0)
        .ok_or_else(|| {
            CollectorError::PlatformUnsupported("processor count unavailable".to_string())
        })?;

    let clock_tick_rate = probe
        .clock_tick_rate()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| {
            CollectorError::PlatformUnsupported("clock tick rate unavailable".to_string())
        })?;

    let processor_speed_hz = probe.processor_speed_hz();
    if processor_speed_hz.is_none() {
        debug!("Processor clock speed not available");
    }

    info!(
        processor_count,
        clock_tick_rate,
        processor_speed_hz = processor_speed_hz.unwrap_or(0.0),
        "Hardware discovery complete"
    );

    Ok(HardwareInfo {
        processor_count,
        clock_tick_rate,
        processor_speed_hz,
    })
}

/// Probe backed by `sysconf(3)` and `/proc/cpuinfo`.
#[derive(Debug, Clone)]
pub struct SysconfProbe {
    proc_root: PathBuf,
}

impl SysconfProbe {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }
}

impl Default for SysconfProbe {
    fn default() -> Self {
        Self::new("/proc")
    }
}

#[cfg(unix)]
fn sysconf_positive(name: libc::c_int) -> Option<libc::c_long> {
    // SAFETY: sysconf has no memory-safety preconditions.
    // Returns -1 on error, 0 if undefined - both rejected by the > 0 check
    let value = unsafe { libc::sysconf(name) };
    (value > 0).then_some(value)
}

impl HardwareProbe for SysconfProbe {
    fn processor_count(&self) -> Option<usize> {
        #[cfg(unix)]
        {
            sysconf_positive(libc::_SC_NPROCESSORS_ONLN).map(|n| n as usize)
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    fn clock_tick_rate(&self) -> Option<f64> {
        #[cfg(unix)]
        {
            sysconf_positive(libc::_SC_CLK_TCK).map(|tck| tck as f64)
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    fn processor_speed_hz(&self) -> Option<f64> {
        let content = fs::read_to_string(self.proc_root.join("cpuinfo")).ok()?;
        parse_cpuinfo_speed_hz(&content)
    }
}

/// Probe with explicit values, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe {
    pub processor_count: Option<usize>,
    pub clock_tick_rate: Option<f64>,
    pub processor_speed_hz: Option<f64>,
}

impl FixedProbe {
    pub fn new(processor_count: usize, clock_tick_rate: f64) -> Self {
        Self {
            processor_count: Some(processor_count),
            clock_tick_rate: Some(clock_tick_rate),
            processor_speed_hz: None,
        }
    }
}

impl HardwareProbe for FixedProbe {
    fn processor_count(&self) -> Option<usize> {
        self.processor_count
    }

    fn clock_tick_rate(&self) -> Option<f64> {
        self.clock_tick_rate
    }

    fn processor_speed_hz(&self) -> Option<f64> {
        self.processor_speed_hz
    }
}

/// Extracts the first "cpu MHz" value from /proc/cpuinfo, in Hz.
///
/// Format: "cpu MHz\t\t: 2394.454"
pub fn parse_cpuinfo_speed_hz(content: &str) -> Option<f64> {
    content
        .lines()
        .filter(|line| line.starts_with("cpu MHz"))
        .find_map(|line| {
            let (_, value) = line.split_once(':')?;
            value.trim().parse::<f64>().ok()
        })
        .filter(|mhz| *mhz > 0.0)
        .map(|mhz| mhz * 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_with_fixed_values() {
        let info = discover(&FixedProbe::new(4, 100.0)).unwrap();
        assert_eq!(info.processor_count, 4);
        assert_eq!(info.clock_tick_rate, 100.0);
        assert_eq!(info.processor_speed_hz, None);
    }

    #[test]
    fn test_discover_rejects_missing_processor_count() {
        let probe = FixedProbe {
            processor_count: None,
            clock_tick_rate: Some(100.0),
            processor_speed_hz: None,
        };
        let err = discover(&probe).unwrap_err();
        assert!(matches!(err, CollectorError::PlatformUnsupported(_)));
    }

    #[test]
    fn test_discover_rejects_zero_values() {
        assert!(discover(&FixedProbe::new(0, 100.0)).is_err());
        assert!(discover(&FixedProbe::new(2, 0.0)).is_err());
        assert!(discover(&FixedProbe::new(2, f64::NAN)).is_err());
    }

    #[test]
    fn test_parse_cpuinfo_speed() {
        let content = "processor\t: 0\nvendor_id\t: GenuineIntel\ncpu MHz\t\t: 2400.000\n\
                       processor\t: 1\ncpu MHz\t\t: 1800.000\n";
        assert_eq!(parse_cpuinfo_speed_hz(content), Some(2_400_000_000.0));
    }

    #[test]
    fn test_parse_cpuinfo_speed_missing() {
        // ARM kernels often omit the field
        let content = "processor\t: 0\nBogoMIPS\t: 48.00\n";
        assert_eq!(parse_cpuinfo_speed_hz(content), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_sysconf_probe_on_host() {
        let probe = SysconfProbe::default();
        assert!(probe.processor_count().unwrap_or(0) >= 1);
        assert!(probe.clock_tick_rate().unwrap_or(0.0) > 0.0);
    }
}
