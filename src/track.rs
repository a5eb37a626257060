//! # Track and Sample Types
//!
//! The output-side data model: one [`VideoTrack`], [`AudioTrack`], [`Id3Track`]
//! and [`TextTrack`] per demuxed program, each holding the samples extracted
//! from the most recent `push()` call. Byte payloads are `Bytes` views into
//! the input buffer, following the zero-copy convention this codebase's
//! `av::packet::Packet` already established.

use bytes::Bytes;

/// Fixed track identifiers, stable for the lifetime of a stream.
pub mod track_id {
    /// Identifier of the video track.
    pub const VIDEO: usize = 0;
    /// Identifier of the audio track.
    pub const AUDIO: usize = 1;
    /// Identifier of the ID3 metadata track.
    pub const ID3: usize = 2;
    /// Identifier of the CEA-608 caption ("text") track.
    pub const TEXT: usize = 3;
}

/// Input time scale used for every PTS/DTS value in this crate: 90 kHz.
pub const TIME_SCALE: u32 = 90_000;

/// A single NAL unit (Annex-B framed, emulation-prevention already removed)
/// belonging to one video access unit.
#[derive(Debug, Clone)]
pub struct NalUnit {
    /// Codec-specific NAL unit type (AVC: low 5 bits of the header byte;
    /// HEVC: 6-bit type field).
    pub nal_type: u8,
    /// Raw NAL payload, including its one- or two-byte header.
    pub data: Bytes,
}

impl NalUnit {
    /// Wraps `data` tagged with `nal_type`.
    pub fn new(nal_type: u8, data: Bytes) -> Self {
        Self { nal_type, data }
    }

    /// Number of bytes in this NAL unit.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if this NAL unit carries no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One coded access unit: every NAL belonging to a single presented picture.
#[derive(Debug, Clone)]
pub struct VideoSample {
    /// Presentation timestamp, 90 kHz.
    pub pts: i64,
    /// Decode timestamp, 90 kHz.
    pub dts: i64,
    /// True if this access unit can be decoded without reference to any
    /// other access unit.
    pub key: bool,
    /// True if this access unit contains at least one coded slice (as
    /// opposed to only parameter sets / delimiters).
    pub frame: bool,
    /// NAL units in decode order.
    pub units: Vec<NalUnit>,
}

impl VideoSample {
    /// Creates an empty access unit at the given timestamps.
    pub fn new(pts: i64, dts: i64) -> Self {
        Self {
            pts,
            dts,
            key: false,
            frame: false,
            units: Vec::new(),
        }
    }

    /// Appends a NAL unit to this access unit.
    pub fn push_unit(&mut self, unit: NalUnit) {
        self.units.push(unit);
    }

    /// Total size in bytes of every NAL unit in this access unit.
    pub fn len(&self) -> usize {
        self.units.iter().map(NalUnit::len).sum()
    }

    /// True if this access unit currently holds no NAL units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// One decoded audio frame (one ADTS frame, or one MPEG audio frame).
#[derive(Debug, Clone)]
pub struct AudioSample {
    /// Presentation timestamp, 90 kHz.
    pub pts: i64,
    /// Decode timestamp, 90 kHz (always equal to `pts` for audio).
    pub dts: i64,
    /// Raw frame payload, codec headers stripped.
    pub data: Bytes,
}

/// A CEA-608 byte-pair group extracted from one SEI message.
#[derive(Debug, Clone)]
pub struct CaptionSample {
    /// Presentation timestamp, 90 kHz, inherited from the carrying access unit.
    pub pts: i64,
    /// SEI `user_data_type_code` this group was extracted from (always 3 for
    /// CEA-608/708 `cc_data()`).
    pub kind: u8,
    /// Raw `cc_data()` bytes: `(cc_valid<<2 | cc_type) , cc_data1 , cc_data2` per pair.
    pub data: Bytes,
}

/// Opaque ID3 metadata payload carried on its own PID.
#[derive(Debug, Clone)]
pub struct Id3Sample {
    /// Presentation timestamp, 90 kHz.
    pub pts: i64,
    /// Decode timestamp, 90 kHz.
    pub dts: i64,
    /// Raw PES payload.
    pub data: Bytes,
}

/// Video elementary stream state and accumulated samples.
#[derive(Debug, Clone, Default)]
pub struct VideoTrack {
    /// PID this track is currently bound to, once learned from the PMT.
    pub pid: Option<u16>,
    /// PMT stream_type (`STREAM_TYPE_H264` or `STREAM_TYPE_H265`).
    pub stream_type: Option<u8>,
    /// RFC 6381 codec string, e.g. `"avc1.640028"` or `"hev1.1.6.L93.B0"`.
    pub codec: Option<String>,
    /// Coded width in pixels, from the active SPS.
    pub width: Option<u32>,
    /// Coded height in pixels, from the active SPS.
    pub height: Option<u32>,
    /// Sample aspect ratio, when signalled by the SPS (`(num, den)`).
    pub pixel_ratio: Option<(u32, u32)>,
    /// Most recently parsed SPS NAL payload.
    pub sps: Option<Bytes>,
    /// Most recently parsed PPS NAL payload.
    pub pps: Option<Bytes>,
    /// Most recently parsed VPS NAL payload (HEVC only).
    pub vps: Option<Bytes>,
    /// HEVC `chroma_format_idc`.
    pub chroma_format_idc: Option<u8>,
    /// HEVC `bit_depth_luma_minus8`.
    pub bit_depth_luma_minus8: Option<u8>,
    /// HEVC `bit_depth_chroma_minus8`.
    pub bit_depth_chroma_minus8: Option<u8>,
    /// Access units produced by the most recent `push()` call.
    pub samples: Vec<VideoSample>,
    /// Sum of every sample's byte length ever pushed onto this track.
    pub len: usize,
    /// Access units dropped because no keyframe was available after a
    /// discontinuity and `force_key_frame_on_discontinuity` was set.
    pub dropped: usize,
}

impl VideoTrack {
    /// Appends `sample` to this track and updates the running length.
    pub fn push_sample(&mut self, sample: VideoSample) {
        self.len += sample.len();
        self.samples.push(sample);
    }

    /// Clears the samples produced by the previous `push()` call along with
    /// `len`, so `len` keeps equaling `sum(samples.len())` across calls (P2)
    /// instead of accumulating forever while `samples` is freshly emptied
    /// every call. PID binding and parameter sets are untouched.
    pub fn clear_samples(&mut self) {
        self.samples.clear();
        self.len = 0;
    }

    /// Clears accumulated samples, PID binding and parameter sets, leaving
    /// the track ready to begin a fresh init segment.
    pub fn reset(&mut self) {
        *self = VideoTrack::default();
    }
}

/// Audio elementary stream state and accumulated samples.
#[derive(Debug, Clone, Default)]
pub struct AudioTrack {
    /// PID this track is currently bound to, once learned from the PMT.
    pub pid: Option<u16>,
    /// PMT stream_type (`STREAM_TYPE_AAC`, or one of the MPEG audio types).
    pub stream_type: Option<u8>,
    /// RFC 6381 codec string, e.g. `"mp4a.40.2"`.
    pub codec: Option<String>,
    /// Sampling rate in Hz.
    pub samplerate: Option<u32>,
    /// Number of audio channels.
    pub channel_count: Option<u8>,
    /// AAC object type (2 = LC, 5 = HE-AAC/SBR), unset for MPEG audio.
    pub object_type: Option<u8>,
    /// Audio frames produced by the most recent `push()` call.
    pub samples: Vec<AudioSample>,
    /// Sum of every sample's byte length ever pushed onto this track.
    pub len: usize,
}

impl AudioTrack {
    /// Appends `sample` to this track and updates the running length.
    pub fn push_sample(&mut self, sample: AudioSample) {
        self.len += sample.data.len();
        self.samples.push(sample);
    }

    /// Clears the samples produced by the previous `push()` call along with
    /// `len` (see [`VideoTrack::clear_samples`]). PID binding and codec
    /// configuration are untouched.
    pub fn clear_samples(&mut self) {
        self.samples.clear();
        self.len = 0;
    }

    /// Clears accumulated samples, PID binding and configuration.
    pub fn reset(&mut self) {
        *self = AudioTrack::default();
    }
}

/// ID3 metadata track state and accumulated samples.
#[derive(Debug, Clone, Default)]
pub struct Id3Track {
    /// PID this track is currently bound to, once learned from the PMT.
    pub pid: Option<u16>,
    /// Metadata payloads produced by the most recent `push()` call.
    pub samples: Vec<Id3Sample>,
}

impl Id3Track {
    /// Appends `sample` to this track.
    pub fn push_sample(&mut self, sample: Id3Sample) {
        self.samples.push(sample);
    }

    /// Clears accumulated samples and PID binding.
    pub fn reset(&mut self) {
        *self = Id3Track::default();
    }
}

/// CEA-608 caption track state and accumulated samples.
///
/// Unlike the other tracks this one has no PID of its own: its samples are
/// extracted from SEI messages embedded in the video track's access units.
#[derive(Debug, Clone, Default)]
pub struct TextTrack {
    /// Caption groups produced by the most recent `push()` call, in
    /// non-decreasing PTS order.
    pub samples: Vec<CaptionSample>,
}

impl TextTrack {
    /// Inserts `sample` keeping `samples` sorted by non-decreasing PTS.
    pub fn insert_sorted(&mut self, sample: CaptionSample) {
        let idx = self
            .samples
            .iter()
            .position(|s| s.pts > sample.pts)
            .unwrap_or(self.samples.len());
        self.samples.insert(idx, sample);
    }

    /// Clears accumulated samples.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
