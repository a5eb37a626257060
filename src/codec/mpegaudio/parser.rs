//! MPEG audio frame syncword search and header parsing.
//!
//! Unlike ADTS, each frame is fully self-delimited by its own header, so no
//! overflow-byte carry is needed across PES boundaries: the demuxer simply
//! scans until fewer than 4 bytes remain and defers the remainder to the
//! next call by leaving it unconsumed (it will reappear prefixed to the next
//! PES's payload via the same PES-accumulation path every other payload
//! type uses).

use super::types::{MpegAudioHeader, MpegLayer, MpegVersion, BITRATES_V1, BITRATES_V2};
use crate::error::DemuxError;
use crate::Result;

/// Finds the first MPEG audio frame sync (11 set bits, `0xFFEx` or above) in
/// `data`.
pub fn find_syncword(data: &[u8]) -> Option<usize> {
    if data.len() < 2 {
        return None;
    }
    (0..=data.len() - 2).find(|&i| data[i] == 0xFF && (data[i + 1] & 0xE0) == 0xE0)
}

/// Parses a 4-byte MPEG audio frame header starting at `data[0]`.
pub fn parse_header(data: &[u8]) -> Result<MpegAudioHeader> {
    if data.len() < 4 {
        return Err(DemuxError::InvalidData("MPEG audio header too short".into()));
    }

    let version = match (data[1] >> 3) & 0x3 {
        0b00 => MpegVersion::V2_5,
        0b10 => MpegVersion::V2,
        0b11 => MpegVersion::V1,
        _ => return Err(DemuxError::InvalidData("reserved MPEG audio version".into())),
    };
    let layer = match (data[1] >> 1) & 0x3 {
        0b01 => MpegLayer::Layer3,
        0b10 => MpegLayer::Layer2,
        0b11 => MpegLayer::Layer1,
        _ => return Err(DemuxError::InvalidData("reserved MPEG audio layer".into())),
    };

    let bitrate_index = ((data[2] >> 4) & 0xF) as usize;
    if bitrate_index == 0 || bitrate_index == 15 {
        return Err(DemuxError::InvalidData("free/bad MPEG audio bitrate index".into()));
    }
    let layer_index = match layer {
        MpegLayer::Layer1 => 0,
        MpegLayer::Layer2 => 1,
        MpegLayer::Layer3 => 2,
    };
    let bitrate_kbps = match version {
        MpegVersion::V1 => BITRATES_V1[layer_index][bitrate_index],
        MpegVersion::V2 | MpegVersion::V2_5 => BITRATES_V2[layer_index][bitrate_index],
    };

    let sample_rate_index = ((data[2] >> 2) & 0x3) as usize;
    if sample_rate_index == 3 {
        return Err(DemuxError::InvalidData("reserved MPEG audio sample rate".into()));
    }
    let sample_rate = version.sample_rates()[sample_rate_index];

    let padding = ((data[2] >> 1) & 0x1) as u32;
    let channel_mode = (data[3] >> 6) & 0x3;
    let channels = if channel_mode == 0b11 { 1 } else { 2 };

    let bitrate_bps = bitrate_kbps * 1000;
    let frame_length = match layer {
        MpegLayer::Layer1 => (12 * bitrate_bps / sample_rate + padding) * 4,
        MpegLayer::Layer2 => 144 * bitrate_bps / sample_rate + padding,
        MpegLayer::Layer3 => match version {
            MpegVersion::V1 => 144 * bitrate_bps / sample_rate + padding,
            MpegVersion::V2 | MpegVersion::V2_5 => 72 * bitrate_bps / sample_rate + padding,
        },
    };

    Ok(MpegAudioHeader {
        version,
        layer,
        sample_rate,
        channels,
        frame_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mpeg1_layer3_128kbps_44100() {
        // FF FB 90 04: MPEG1, Layer III, bitrate index 9 (128kbps), 44.1kHz, no padding, stereo mode.
        let data = [0xFF, 0xFB, 0x90, 0x04];
        let header = parse_header(&data).unwrap();
        assert_eq!(header.version, MpegVersion::V1);
        assert_eq!(header.layer, MpegLayer::Layer3);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.channels, 2);
        assert_eq!(header.frame_length, 144 * 128000 / 44100);
        assert_eq!(header.codec_string(), "mp4a.40.34");
    }

    #[test]
    fn finds_syncword_at_offset() {
        let mut data = vec![0x00, 0x01];
        data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0xC4]);
        assert_eq!(find_syncword(&data), Some(2));
    }

    #[test]
    fn rejects_reserved_sample_rate() {
        let data = [0xFF, 0xFB, 0x9C, 0xC4];
        assert!(parse_header(&data).is_err());
    }
}
