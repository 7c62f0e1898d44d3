//! Media segment transmux control.
//!
//! This crate decides which demuxer/remuxer pair applies to a raw media
//! segment and keeps that pairing valid for the lifetime of a stream. An
//! incoming buffer is decrypted when an AES-128 descriptor accompanies it,
//! probed against the registered container formats with codec hints
//! breaking ties, and handed to the bound demuxer together with its timing
//! metadata. Discontinuities and track switches drive the reset protocol;
//! a discontinuity whose buffer no longer matches the bound format tears
//! the pairing down and reselects from scratch.
//!
//! Demuxer and remuxer internals are collaborator concerns: this crate
//! defines their contracts and controls their lifecycle, nothing more.

pub mod clock;
pub mod config;
pub mod decrypt;
pub mod demux;
pub mod error;
pub mod events;
pub mod probe;
pub mod registry;
pub mod transmuxer;

pub use clock::{Clock, MonotonicClock, SystemClock};
pub use config::{CapabilitySet, ClockKind, TransmuxConfig};
pub use decrypt::{DecryptData, Decrypter, EncryptionMethod};
pub use demux::{Demuxer, PipelineContext, Remuxer};
pub use error::TransmuxError;
pub use events::{DecryptStats, ErrorDetails, ErrorKind, EventSink, TransmuxEvent};
pub use registry::{DemuxerCtor, FormatDescriptor, Registry, RemuxerCtor};
pub use transmuxer::{PushMeta, Transmuxer};

pub use media_types::SegmentFormat;

/// Result type for transmux operations
pub type Result<T> = std::result::Result<T, TransmuxError>;
