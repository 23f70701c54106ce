//! Startup requirement validation for herakles-perf-collector.
//!
//! This module validates that the counter sources the collector reads are
//! present and readable before sampling starts.

use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Validate all runtime requirements
pub fn validate_requirements(proc_root: &Path) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_proc_root(proc_root)?;
    check_required_source(proc_root, "stat")?;
    check_optional_source(proc_root, "interrupts", "interrupt rates fall back to the intr total");
    check_optional_source(proc_root, "net/dev", "network interface statistics unavailable");
    check_optional_source(proc_root, "net/snmp", "TCP statistics unavailable");
    check_optional_source(proc_root, "partitions", "disk targets cannot be listed");

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Check that the proc filesystem root exists
fn check_proc_root(proc_root: &Path) -> Result<(), ValidationError> {
    if !proc_root.is_dir() {
        error!("❌ {} not found - proc filesystem not mounted?", proc_root.display());
        return Err(ValidationError::ProcNotMounted(
            proc_root.display().to_string(),
        ));
    }
    debug!("{} is a directory", proc_root.display());
    Ok(())
}

/// Check a source the collector cannot run without
fn check_required_source(proc_root: &Path, name: &str) -> Result<(), ValidationError> {
    let path = proc_root.join(name);
    match fs::read_to_string(&path) {
        Ok(_) => {
            info!("✅ {} readable", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            error!("❌ Cannot read {} - insufficient permissions", path.display());
            Err(ValidationError::InsufficientPermissions(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
        Err(e) => {
            error!("❌ Cannot read {}: {}", path.display(), e);
            Err(ValidationError::SourceUnavailable(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
    }
}

/// Check a source whose absence only degrades output
fn check_optional_source(proc_root: &Path, name: &str, consequence: &str) {
    let path = proc_root.join(name);
    match fs::metadata(&path) {
        Ok(_) => info!("✅ {} available", path.display()),
        Err(e) => {
            warn!("⚠️  {} not accessible ({}) - {}", path.display(), e, consequence);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Proc filesystem not found at {0}")]
    ProcNotMounted(String),

    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("Counter source unavailable: {0}")]
    SourceUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = dir.path().join("nope");
        assert!(matches!(
            validate_requirements(&missing),
            Err(ValidationError::ProcNotMounted(_))
        ));
    }

    #[test]
    fn test_missing_stat_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        assert!(matches!(
            validate_requirements(dir.path()),
            Err(ValidationError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_optional_sources_do_not_fail() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("stat"), "cpu0 1 2 3 4 5 6 7\n").unwrap();
        assert!(validate_requirements(dir.path()).is_ok());
    }
}
