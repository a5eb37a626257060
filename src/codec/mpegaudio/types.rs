//! MPEG-1/2 Layer I/II/III frame header (ISO/IEC 11172-3 / 13818-3).

/// MPEG audio version signalled by the 2-bit `ID` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-2.5 (unofficial extension for very low sample rates).
    V2_5,
    /// MPEG-2.
    V2,
    /// MPEG-1.
    V1,
}

/// Layer signalled by the 2-bit `layer` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegLayer {
    Layer1,
    Layer2,
    Layer3,
}

/// A parsed MPEG audio frame header.
#[derive(Debug, Clone, Copy)]
pub struct MpegAudioHeader {
    pub version: MpegVersion,
    pub layer: MpegLayer,
    /// Sampling rate in Hz.
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo/joint-stereo/dual-channel).
    pub channels: u8,
    /// Total frame length in bytes, header included.
    pub frame_length: u32,
}

impl MpegAudioHeader {
    /// RFC 6381-style codec string. This crate reports the generic MPEG
    /// audio object type rather than a layer-specific `mp4a.40.*` value,
    /// since Layer I/II have no standard `mp4a` object type.
    pub fn codec_string(&self) -> String {
        match self.layer {
            MpegLayer::Layer3 => "mp4a.40.34".to_string(),
            MpegLayer::Layer2 => "mp4a.40.33".to_string(),
            MpegLayer::Layer1 => "mp4a.40.32".to_string(),
        }
    }
}

impl MpegVersion {
    /// Sampling rate table for this version, indexed by the 2-bit
    /// `sampling_frequency` header field (index 3 is always reserved).
    pub(super) fn sample_rates(self) -> [u32; 3] {
        match self {
            MpegVersion::V1 => [44100, 48000, 32000],
            MpegVersion::V2 => [22050, 24000, 16000],
            MpegVersion::V2_5 => [11025, 12000, 8000],
        }
    }
}

pub(super) const BITRATES_V1: [[u32; 15]; 3] = [
    [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448], // Layer I
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],    // Layer II
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],     // Layer III
];

pub(super) const BITRATES_V2: [[u32; 15]; 3] = [
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256], // Layer I
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],      // Layer II
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],      // Layer III
];
