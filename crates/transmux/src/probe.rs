//! Header probes for the registered container formats.
//!
//! Probes are pure and side-effect free: each inspects just enough header
//! structure to decide whether a buffer belongs to its format, and never
//! parses further. The selector runs every probe on each reselection and
//! resolves multi-matches with codec hints, so none of them short-circuit
//! the others.

use media_types::SegmentFormat;

/// Signature shared by all format probes.
pub type ProbeFn = fn(&[u8]) -> bool;

/// MPEG-TS packet length in bytes.
const TS_PACKET_SIZE: usize = 188;
/// MPEG-TS sync byte.
const TS_SYNC_BYTE: u8 = 0x47;

/// The fixed probe for a format.
pub fn probe_for(format: SegmentFormat) -> ProbeFn {
    match format {
        SegmentFormat::MpegTs => probe_ts,
        SegmentFormat::Aac => probe_aac,
        SegmentFormat::Mp3 => probe_mp3,
        SegmentFormat::Fmp4 => probe_fmp4,
    }
}

/// Transport stream: a sync byte recurring one packet apart, scanning the
/// first packet window to allow for a partial leading packet.
pub fn probe_ts(data: &[u8]) -> bool {
    if data.len() <= TS_PACKET_SIZE {
        return false;
    }
    let window = TS_PACKET_SIZE.min(data.len() - TS_PACKET_SIZE);
    (0..window).any(|i| data[i] == TS_SYNC_BYTE && data[i + TS_PACKET_SIZE] == TS_SYNC_BYTE)
}

/// Byte length of an ID3v2 tag at the head of the buffer, zero if absent.
fn id3_tag_len(data: &[u8]) -> usize {
    if data.len() < 10 || &data[..3] != b"ID3" {
        return 0;
    }
    // Syncsafe 28-bit tag size; the size field excludes header and footer
    let size = ((data[6] as usize & 0x7F) << 21)
        | ((data[7] as usize & 0x7F) << 14)
        | ((data[8] as usize & 0x7F) << 7)
        | (data[9] as usize & 0x7F);
    let footer = if data[5] & 0x10 != 0 { 10 } else { 0 };
    10 + size + footer
}

/// ADTS-framed AAC: frame sync with zeroed layer bits after any leading
/// ID3v2 tag.
pub fn probe_aac(data: &[u8]) -> bool {
    let offset = id3_tag_len(data);
    data.len() >= offset + 2 && data[offset] == 0xFF && (data[offset + 1] & 0xF6) == 0xF0
}

/// MP3: frame sync with non-zero layer bits (which rules out ADTS) after
/// any leading ID3v2 tag.
pub fn probe_mp3(data: &[u8]) -> bool {
    let offset = id3_tag_len(data);
    data.len() >= offset + 2
        && data[offset] == 0xFF
        && (data[offset + 1] & 0xE0) == 0xE0
        && (data[offset + 1] & 0x06) != 0
}

/// Fragmented MP4: a leading ISO-BMFF box tag, or a `moov` box within the
/// first KiB for init-led buffers.
pub fn probe_fmp4(data: &[u8]) -> bool {
    if data.len() < 8 {
        return false;
    }
    let tag = &data[4..8];
    if tag == b"ftyp" || tag == b"styp" || tag == b"moof" || tag == b"sidx" {
        return true;
    }
    for i in 0..data.len().min(1024).saturating_sub(8) {
        if &data[i + 4..i + 8] == b"moov" {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts_bytes() -> Vec<u8> {
        let mut data = vec![0u8; 3 * TS_PACKET_SIZE];
        data[0] = TS_SYNC_BYTE;
        data[TS_PACKET_SIZE] = TS_SYNC_BYTE;
        data[2 * TS_PACKET_SIZE] = TS_SYNC_BYTE;
        data
    }

    #[test]
    fn test_probe_ts() {
        assert!(probe_ts(&ts_bytes()));
        assert!(!probe_ts(&[TS_SYNC_BYTE; TS_PACKET_SIZE]));
        assert!(!probe_ts(b"not a transport stream"));
        assert!(!probe_ts(&[]));
    }

    #[test]
    fn test_probe_ts_partial_leading_packet() {
        // Sync bytes one packet apart but not at offset zero
        let mut data = vec![0u8; 3 * TS_PACKET_SIZE];
        data[17] = TS_SYNC_BYTE;
        data[17 + TS_PACKET_SIZE] = TS_SYNC_BYTE;
        assert!(probe_ts(&data));
    }

    #[test]
    fn test_probe_aac() {
        assert!(probe_aac(&[0xFF, 0xF1, 0x50, 0x80]));
        assert!(probe_aac(&[0xFF, 0xF9, 0x50, 0x80]));
        // MP3 frame sync has non-zero layer bits
        assert!(!probe_aac(&[0xFF, 0xFB, 0x90, 0x64]));
        assert!(!probe_aac(&[0x47, 0x40]));
        assert!(!probe_aac(&[0xFF]));
    }

    #[test]
    fn test_probe_aac_skips_id3() {
        // 10-byte ID3v2 header, zero-length body, then ADTS sync
        let mut data = vec![b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 0];
        data.extend_from_slice(&[0xFF, 0xF1, 0x50, 0x80]);
        assert!(probe_aac(&data));
        assert!(!probe_mp3(&data));
    }

    #[test]
    fn test_probe_mp3() {
        assert!(probe_mp3(&[0xFF, 0xFB, 0x90, 0x64]));
        assert!(probe_mp3(&[0xFF, 0xE2, 0x00, 0x00]));
        // ADTS sync must not register as MP3
        assert!(!probe_mp3(&[0xFF, 0xF1, 0x50, 0x80]));
        assert!(!probe_mp3(&[0x00, 0xFB]));
    }

    #[test]
    fn test_probe_mp3_skips_id3() {
        let mut data = vec![b'I', b'D', b'3', 3, 0, 0, 0, 0, 0, 5];
        data.extend_from_slice(&[0u8; 5]);
        data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        assert!(probe_mp3(&data));
        assert!(!probe_aac(&data));
    }

    #[test]
    fn test_probe_fmp4_leading_boxes() {
        for tag in [b"ftyp", b"styp", b"moof", b"sidx"] {
            let mut data = vec![0x00, 0x00, 0x00, 0x18];
            data.extend_from_slice(tag);
            data.extend_from_slice(&[0u8; 16]);
            assert!(probe_fmp4(&data), "tag {:?}", std::str::from_utf8(tag));
        }
    }

    #[test]
    fn test_probe_fmp4_moov_scan() {
        let mut data = vec![0u8; 64];
        data[40..44].copy_from_slice(b"moov");
        assert!(probe_fmp4(&data));
    }

    #[test]
    fn test_probe_fmp4_rejects_other_content() {
        assert!(!probe_fmp4(&ts_bytes()));
        assert!(!probe_fmp4(b"mdat"));
        assert!(!probe_fmp4(&[0u8; 32]));
    }

    #[test]
    fn test_probes_are_independent_on_ambiguous_content() {
        // A buffer can satisfy both the TS and fMP4 probes; the selector
        // resolves such ties with codec hints.
        let mut data = vec![0u8; 400];
        data[4..8].copy_from_slice(b"styp");
        data[10] = TS_SYNC_BYTE;
        data[10 + TS_PACKET_SIZE] = TS_SYNC_BYTE;
        assert!(probe_ts(&data));
        assert!(probe_fmp4(&data));
        assert!(!probe_aac(&data));
        assert!(!probe_mp3(&data));
    }

    #[test]
    fn test_probe_for_binds_each_format() {
        assert!(probe_for(SegmentFormat::MpegTs)(&ts_bytes()));
        assert!(probe_for(SegmentFormat::Aac)(&[0xFF, 0xF1, 0x50, 0x80]));
        assert!(probe_for(SegmentFormat::Mp3)(&[0xFF, 0xFB, 0x90, 0x64]));
        assert!(probe_for(SegmentFormat::Fmp4)(
            b"\x00\x00\x00\x18ftypisom\x00\x00\x00\x00"
        ));
    }
}
