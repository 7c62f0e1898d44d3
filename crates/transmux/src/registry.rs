//! The registered format table: one probe plus constructor pair per
//! format, assembled once at process start and read-only afterwards.

use std::fmt;
use std::sync::Arc;

use media_types::SegmentFormat;

use crate::Result;
use crate::demux::{Demuxer, PipelineContext, Remuxer};
use crate::probe::{ProbeFn, probe_for};

/// Factory for a format's demuxer.
///
/// Failures are reported as [`crate::TransmuxError::Construction`] and
/// drop the push that triggered construction, leaving any previously
/// bound pipeline in place.
pub type DemuxerCtor = Arc<dyn Fn(&PipelineContext) -> Result<Box<dyn Demuxer>> + Send + Sync>;

/// Factory for a format's remuxer.
pub type RemuxerCtor = Arc<dyn Fn(&PipelineContext) -> Result<Box<dyn Remuxer>> + Send + Sync>;

/// One registered format: its identity, its fixed header probe, and the
/// constructor pair producing a bound pipeline.
#[derive(Clone)]
pub struct FormatDescriptor {
    format: SegmentFormat,
    probe: ProbeFn,
    demuxer: DemuxerCtor,
    remuxer: RemuxerCtor,
}

impl FormatDescriptor {
    /// Register a constructor pair for a format. The probe is fixed by
    /// the format identity.
    pub fn new(format: SegmentFormat, demuxer: DemuxerCtor, remuxer: RemuxerCtor) -> Self {
        Self {
            format,
            probe: probe_for(format),
            demuxer,
            remuxer,
        }
    }

    #[inline]
    pub fn format(&self) -> SegmentFormat {
        self.format
    }

    #[inline]
    pub fn probe(&self) -> ProbeFn {
        self.probe
    }

    pub(crate) fn new_demuxer(&self, ctx: &PipelineContext) -> Result<Box<dyn Demuxer>> {
        (self.demuxer)(ctx)
    }

    pub(crate) fn new_remuxer(&self, ctx: &PipelineContext) -> Result<Box<dyn Remuxer>> {
        (self.remuxer)(ctx)
    }
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Immutable table of registered formats.
///
/// Assembled once at startup from the embedder's constructor pairs; the
/// selector only iterates it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<FormatDescriptor>,
}

impl Registry {
    pub fn new(entries: Vec<FormatDescriptor>) -> Self {
        Self { entries }
    }

    pub(crate) fn entries(&self) -> &[FormatDescriptor] {
        &self.entries
    }
}
