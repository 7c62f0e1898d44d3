pub mod codec;

/// Container/codec format of a media segment, as decided by probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentFormat {
    /// MPEG-2 Transport Stream
    MpegTs,
    /// ADTS-framed AAC elementary stream
    Aac,
    /// MPEG-1 layer III elementary stream
    Mp3,
    /// Fragmented MP4 (ISO-BMFF)
    Fmp4,
}

impl std::fmt::Display for SegmentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentFormat::MpegTs => write!(f, "ts"),
            SegmentFormat::Aac => write!(f, "aac"),
            SegmentFormat::Mp3 => write!(f, "mp3"),
            SegmentFormat::Fmp4 => write!(f, "fmp4"),
        }
    }
}
