//! The transmux controller: decrypt sequencing, format selection and the
//! pipeline reset protocol.

use std::sync::Arc;

use bytes::Bytes;
use media_types::{SegmentFormat, codec};
use tracing::{debug, warn};

use crate::Result;
use crate::clock::Clock;
use crate::config::{CapabilitySet, TransmuxConfig};
use crate::decrypt::{DecryptData, Decrypter};
use crate::demux::{Demuxer, PipelineContext, Remuxer};
use crate::error::TransmuxError;
use crate::events::{DecryptStats, EventSink, TransmuxEvent};
use crate::probe::ProbeFn;
use crate::registry::{FormatDescriptor, Registry};

/// Per-push metadata accompanying a segment buffer.
///
/// Every field is scoped to the one push it arrives with; nothing here is
/// retained across pushes.
#[derive(Debug, Clone, Default)]
pub struct PushMeta {
    /// Out-of-band codec configuration for the current track.
    pub init_segment: Bytes,
    /// Audio codec identifier from stream metadata, used for detection
    /// tie-breaking only.
    pub audio_codec: Option<String>,
    /// Video codec identifier from stream metadata, used for detection
    /// tie-breaking only.
    pub video_codec: Option<String>,
    /// Segment position on the stream timeline, in seconds.
    pub time_offset: f64,
    /// The stream timeline breaks at this segment.
    pub discontinuity: bool,
    /// Track identity changed at this segment.
    pub track_switch: bool,
    /// The buffer is time-adjacent to the previous one.
    pub contiguous: bool,
    /// Track duration, in seconds.
    pub duration: f64,
    /// The supplied time offset is authoritative.
    pub accurate_time_offset: bool,
    /// Initial presentation timestamp to rebind to on a discontinuity,
    /// in 90 kHz ticks.
    pub default_init_pts: Option<i64>,
}

/// The bound (demuxer, remuxer, probe) triple.
///
/// Replaced wholesale on reselection, never mutated in place; the probe
/// is the one that matched when the pair was created and revalidates
/// buffers cheaply on discontinuities.
struct ActivePipeline {
    format: SegmentFormat,
    probe: ProbeFn,
    demuxer: Box<dyn Demuxer>,
    remuxer: Box<dyn Remuxer>,
}

/// Probes media segments and binds the matching demuxer/remuxer pair.
///
/// One instance serves one stream. [`push`](Transmuxer::push) takes
/// `&mut self` and resolves the decrypt completion before returning, so
/// pushes on a given instance are strictly serialized in input order;
/// overlapping pushes on one controller are unrepresentable.
pub struct Transmuxer {
    observer: EventSink,
    config: Arc<TransmuxConfig>,
    capabilities: CapabilitySet,
    registry: Registry,
    clock: Arc<dyn Clock>,
    decrypter: Option<Decrypter>,
    pipeline: Option<ActivePipeline>,
}

impl Transmuxer {
    pub fn new(
        observer: EventSink,
        config: TransmuxConfig,
        capabilities: CapabilitySet,
        registry: Registry,
    ) -> Self {
        let clock = config.clock.build();
        Self {
            observer,
            config: Arc::new(config),
            capabilities,
            registry,
            clock,
            decrypter: None,
            pipeline: None,
        }
    }

    /// Format of the currently bound pipeline, if any.
    pub fn active_format(&self) -> Option<SegmentFormat> {
        self.pipeline.as_ref().map(|p| p.format)
    }

    /// Process one segment: decrypt when required, (re)bind the pipeline,
    /// apply the reset protocol and hand the buffer to the demuxer.
    ///
    /// Outcomes are delivered through the observer channel and the
    /// demuxer's own downstream effects, not through a return value. A
    /// failure drops the current push, emits exactly one error event and
    /// leaves the controller usable.
    pub async fn push(&mut self, data: Bytes, decrypt_data: Option<DecryptData>, meta: PushMeta) {
        if let Err(e) = self.try_push(data, decrypt_data, meta).await {
            warn!(error = %e, "segment push dropped");
            self.observer.emit_error(&e);
        }
    }

    /// Release the bound pipeline. The controller returns to the unbound
    /// state; a later push re-runs detection from scratch.
    pub fn destroy(&mut self) {
        self.pipeline = None;
    }

    async fn try_push(
        &mut self,
        data: Bytes,
        decrypt_data: Option<DecryptData>,
        meta: PushMeta,
    ) -> Result<()> {
        let data = match &decrypt_data {
            Some(dd) if !data.is_empty() && dd.is_aes128_ready() => self.decrypt(data, dd).await?,
            _ => data,
        };
        self.push_decrypted(data, decrypt_data.as_ref(), &meta)
    }

    /// Run the buffer through the lazily created decrypter and report the
    /// stage timing.
    async fn decrypt(&mut self, data: Bytes, decrypt_data: &DecryptData) -> Result<Bytes> {
        let Some(key) = decrypt_data.key.as_ref() else {
            return Ok(data);
        };
        let offload = self.config.offload_decryption;
        let decrypter = self.decrypter.get_or_insert_with(|| Decrypter::new(offload));

        let started = self.clock.now();
        let decrypted = decrypter.decrypt(data, key, &decrypt_data.iv).await?;
        let finished = self.clock.now();
        self.observer.emit(TransmuxEvent::SegmentDecrypted {
            stats: DecryptStats { started, finished },
        });
        Ok(decrypted)
    }

    fn push_decrypted(
        &mut self,
        data: Bytes,
        decrypt_data: Option<&DecryptData>,
        meta: &PushMeta,
    ) -> Result<()> {
        let must_reselect = match &self.pipeline {
            None => true,
            // A discontinuity may change content type (e.g. an AAC
            // elementary stream following TS), so revalidate with the
            // bound probe before trusting the pair.
            Some(p) => meta.discontinuity && !(p.probe)(&data),
        };

        if must_reselect {
            if self.pipeline.is_some() {
                warn!("bound probe rejected buffer after discontinuity, reselecting format");
            }
            // On failure the previous pipeline stays bound untouched.
            let next = self.select_pipeline(&data, meta)?;
            debug!(format = %next.format, "bound transmux pipeline");
            self.pipeline = Some(next);
        }
        let pipeline = self.pipeline.as_mut().ok_or(TransmuxError::Detection)?;

        if meta.discontinuity || meta.track_switch {
            pipeline.demuxer.reset_init_segment(
                meta.init_segment.clone(),
                meta.audio_codec.as_deref(),
                meta.video_codec.as_deref(),
                meta.duration,
            );
            pipeline.remuxer.reset_init_segment();
        }
        if meta.discontinuity {
            pipeline.demuxer.reset_timestamp(meta.default_init_pts);
            pipeline.remuxer.reset_timestamp(meta.default_init_pts);
        }
        if let Some(dd) = decrypt_data {
            pipeline.demuxer.set_decrypt_data(dd);
        }

        pipeline.demuxer.append(
            data,
            meta.time_offset,
            meta.contiguous,
            meta.accurate_time_offset,
        )
    }

    /// Evaluate every registered probe, then resolve the match set with
    /// the caller's codec hints; unhinted matches fall back to a fixed
    /// order.
    fn select_pipeline(&self, data: &[u8], meta: &PushMeta) -> Result<ActivePipeline> {
        let matched: Vec<&FormatDescriptor> = self
            .registry
            .entries()
            .iter()
            .filter(|d| (d.probe())(data))
            .collect();
        let matching = |format: SegmentFormat| matched.iter().find(|d| d.format() == format);

        let ts = matching(SegmentFormat::MpegTs);
        let aac = matching(SegmentFormat::Aac);
        let mp3 = matching(SegmentFormat::Mp3);
        let fmp4 = matching(SegmentFormat::Fmp4);

        let avc_hint = meta.video_codec.as_deref().is_some_and(codec::is_avc);
        let aac_hint = meta.audio_codec.as_deref().is_some_and(codec::is_aac);
        let mp3_hint = meta.audio_codec.as_deref().is_some_and(codec::is_mp3);

        let descriptor = if avc_hint && ts.is_some() {
            ts
        } else if aac_hint && aac.is_some() {
            aac
        } else if mp3_hint && mp3.is_some() {
            mp3
        } else if avc_hint && fmp4.is_some() {
            fmp4
        } else {
            // No usable hint fired: fixed fallback order
            aac.or(mp3).or(ts).or(fmp4)
        }
        .ok_or(TransmuxError::Detection)?;

        let ctx = PipelineContext {
            observer: self.observer.clone(),
            config: Arc::clone(&self.config),
            capabilities: self.capabilities,
            platform: self.config.platform.clone(),
        };
        // Construct both halves before anything is discarded, so a failed
        // constructor leaves the previous binding intact.
        let remuxer = descriptor.new_remuxer(&ctx)?;
        let demuxer = descriptor.new_demuxer(&ctx)?;

        Ok(ActivePipeline {
            format: descriptor.format(),
            probe: descriptor.probe(),
            demuxer,
            remuxer,
        })
    }
}
