//! Sample clocks.
//!
//! Snapshot timestamps are expressed in clock ticks so that tick-based
//! counters (CPU time from /proc/stat) can be divided by the elapsed time
//! directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of snapshot timestamps, in clock ticks.
pub trait SampleClock: Send {
    fn now_ticks(&self) -> f64;
}

/// Monotonic wall clock scaled to the system clock tick rate.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
    tick_rate: f64,
}

impl MonotonicClock {
    pub fn new(tick_rate: f64) -> Self {
        Self {
            origin: Instant::now(),
            tick_rate,
        }
    }
}

impl SampleClock for MonotonicClock {
    fn now_ticks(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * self.tick_rate
    }
}

/// Externally driven clock.
///
/// Clones share the same reading, so a caller can keep a handle and advance
/// the clock after handing a copy to a collector.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(ticks: f64) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(ticks.to_bits())),
        }
    }

    pub fn set(&self, ticks: f64) {
        self.ticks.store(ticks.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, ticks: f64) {
        self.set(self.now_ticks() + ticks);
    }
}

impl SampleClock for ManualClock {
    fn now_ticks(&self) -> f64 {
        f64::from_bits(self.ticks.load(Ordering::SeqCst))
    }
}
