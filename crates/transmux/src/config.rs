use std::sync::Arc;

use crate::clock::{Clock, MonotonicClock, SystemClock};

/// Which time source backs stage timing measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockKind {
    /// High-resolution monotonic timer (default).
    #[default]
    Monotonic,
    /// Coarse wall clock, for execution environments without a
    /// trustworthy monotonic timer.
    Wall,
}

impl ClockKind {
    pub(crate) fn build(self) -> Arc<dyn Clock> {
        match self {
            ClockKind::Monotonic => Arc::new(MonotonicClock::new()),
            ClockKind::Wall => Arc::new(SystemClock),
        }
    }
}

/// Output capabilities of the embedding playback environment, forwarded
/// to pipeline constructors so they can pick a repackaging target.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilitySet {
    /// MP4 (ISO-BMFF) output is playable.
    pub mp4: bool,
    /// MPEG audio output is playable.
    pub mpeg: bool,
    /// Raw MP3 output is playable.
    pub mp3: bool,
}

/// Configurable options for the transmux controller
#[derive(Debug, Clone)]
pub struct TransmuxConfig {
    /// Offload AES decryption to the blocking thread pool.
    pub offload_decryption: bool,

    /// Time source used for decrypt timing measurements.
    pub clock: ClockKind,

    /// Platform/vendor hint forwarded to pipeline constructors.
    pub platform: Option<String>,
}

impl Default for TransmuxConfig {
    fn default() -> Self {
        Self {
            offload_decryption: true,
            clock: ClockKind::default(),
            platform: None,
        }
    }
}
