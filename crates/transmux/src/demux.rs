//! Collaborator seams: the demuxer/remuxer contracts the controller
//! drives, and the construction context their factories receive.
//!
//! Container parsing and repackaging internals live behind these traits;
//! the controller only sequences resets and appends.

use std::sync::Arc;

use bytes::Bytes;

use crate::Result;
use crate::config::{CapabilitySet, TransmuxConfig};
use crate::decrypt::DecryptData;
use crate::events::EventSink;

/// Construction context handed to demuxer/remuxer factories.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Observer channel for events raised by pipeline components.
    pub observer: EventSink,
    /// Shared controller configuration.
    pub config: Arc<TransmuxConfig>,
    /// Output capabilities of the embedding environment.
    pub capabilities: CapabilitySet,
    /// Platform/vendor hint.
    pub platform: Option<String>,
}

/// A format-specific parser extracting elementary streams from one
/// container format.
///
/// Implementations keep whatever parsing state they need between appends.
/// The controller owns the instance for the lifetime of the binding,
/// drives the reset protocol on discontinuities and track switches, and
/// drops the instance on teardown.
pub trait Demuxer: Send {
    /// Discard held codec configuration and rebind to a new init segment
    /// and codec hints.
    fn reset_init_segment(
        &mut self,
        init_segment: Bytes,
        audio_codec: Option<&str>,
        video_codec: Option<&str>,
        duration: f64,
    );

    /// Discard the timestamp baseline and rebind to a new initial PTS.
    fn reset_timestamp(&mut self, default_init_pts: Option<i64>);

    /// Attach the segment's decryption descriptor.
    ///
    /// Optional capability for parsers that decrypt internally (e.g.
    /// sample-level encryption); the default implementation ignores it.
    fn set_decrypt_data(&mut self, _decrypt_data: &DecryptData) {}

    /// Parse one segment buffer. Terminal step of a push.
    fn append(
        &mut self,
        data: Bytes,
        time_offset: f64,
        contiguous: bool,
        accurate_time_offset: bool,
    ) -> Result<()>;
}

/// Repackages extracted elementary data into a playback-ready container.
pub trait Remuxer: Send {
    /// Discard held initialization state.
    fn reset_init_segment(&mut self);

    /// Discard the timestamp baseline and rebind to a new initial PTS.
    fn reset_timestamp(&mut self, default_init_pts: Option<i64>);
}
