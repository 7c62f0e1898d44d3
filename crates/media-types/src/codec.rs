//! Codec identifier matching used for format-detection tie-breaking.
//!
//! Codec hints arrive as RFC 6381 strings from stream metadata (e.g.
//! `avc1.64001f`, `mp4a.40.2`). Matching is case-insensitive and
//! prefix-based, so profile suffixes never have to be enumerated.

/// MPEG-4 audio object type codes for the AAC-LC, HE-AAC and HE-AACv2 profiles.
const AAC_OBJECT_TYPES: &[&str] = &["mp4a.40.2", "mp4a.40.5", "mp4a.40.29"];

/// MPEG-4 audio object type code for MP3-in-MP4.
const MP3_OBJECT_TYPE: &str = "mp4a.40.34";

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Whether a video codec identifier names an AVC-family codec.
pub fn is_avc(codec: &str) -> bool {
    has_prefix_ignore_case(codec, "avc")
}

/// Whether an audio codec identifier names an AAC profile (LC, HE or HE-v2).
pub fn is_aac(codec: &str) -> bool {
    AAC_OBJECT_TYPES
        .iter()
        .any(|object_type| has_prefix_ignore_case(codec, object_type))
}

/// Whether an audio codec identifier names MP3-in-MP4.
pub fn is_mp3(codec: &str) -> bool {
    has_prefix_ignore_case(codec, MP3_OBJECT_TYPE)
}
