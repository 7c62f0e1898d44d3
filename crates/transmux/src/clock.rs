//! Time sources backing stage timing measurements.
//!
//! The source is selected once when the controller is built (see
//! [`ClockKind`](crate::config::ClockKind)); there is no per-call
//! fallback. Readings are relative to each clock's own origin, so only
//! differences between readings from the same clock are meaningful.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of elapsed-time readings.
pub trait Clock: Send + Sync {
    /// Current reading, as elapsed time since the clock's origin.
    fn now(&self) -> Duration;
}

/// High-resolution monotonic clock anchored at creation.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Coarse wall clock for execution environments where a monotonic source
/// is unavailable or untrustworthy. Readings can step backwards on system
/// time adjustments.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
    }
}
