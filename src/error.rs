//! Error types for the performance collector.
//!
//! Counter anomalies (negative deltas, utilization above 100%) are not errors:
//! they are clamped by the engine and reported through the results.

use std::path::PathBuf;

use crate::counters::Family;

/// Errors surfaced by the collector library.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// Processor count or clock tick rate could not be determined.
    #[error(
        "Unable to initialize needed performance data ({0}). \
         This may indicate an unsupported processor or OS"
    )]
    PlatformUnsupported(String),

    /// Statistics requested before both snapshots exist, or with a non-positive time base.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("Failed to acquire {family} counters: {source}")]
    Acquisition {
        family: Family,
        #[source]
        source: AcquireError,
    },

    #[error("Invalid collector configuration: {0}")]
    Config(String),
}

/// Errors raised while reading raw counters or enumerating targets.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {} format: {detail}", path.display())]
    Format { path: PathBuf, detail: String },

    #[error("Failed to enumerate interface addresses: {0}")]
    Interfaces(#[source] nix::errno::Errno),
}

pub type Result<T> = std::result::Result<T, CollectorError>;
