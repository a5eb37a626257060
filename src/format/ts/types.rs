//! MPEG-2 Transport Stream constants and the parsed PMT record.

/// Fixed TS packet size in bytes.
pub const TS_PACKET_SIZE: usize = 188;
/// Marks the start of every TS packet.
pub const SYNC_BYTE: u8 = 0x47;

/// PID of the Program Association Table.
pub const PID_PAT: u16 = 0x0000;
/// PID of the Service Description Table (ignored by this demuxer).
pub const PID_SDT: u16 = 0x0011;
/// Null packet PID, used for stuffing (ignored).
pub const PID_NULL: u16 = 0x1FFF;

/// AAC audio (ADTS-framed), PMT `stream_type` 0x0F.
pub const STREAM_TYPE_AAC: u8 = 0x0F;
/// MPEG-1 audio, PMT `stream_type` 0x03.
pub const STREAM_TYPE_MPEG1_AUDIO: u8 = 0x03;
/// MPEG-2 audio, PMT `stream_type` 0x04.
pub const STREAM_TYPE_MPEG2_AUDIO: u8 = 0x04;
/// ID3 timed metadata, PMT `stream_type` 0x15.
pub const STREAM_TYPE_ID3: u8 = 0x15;
/// AVC/H.264 video, PMT `stream_type` 0x1B.
pub const STREAM_TYPE_AVC: u8 = 0x1B;
/// HEVC/H.265 video, PMT `stream_type` 0x24.
pub const STREAM_TYPE_HEVC: u8 = 0x24;

/// True if `stream_type` identifies one of the two MPEG Layer II/III audio types.
pub fn is_mpeg_audio_stream_type(stream_type: u8) -> bool {
    matches!(stream_type, STREAM_TYPE_MPEG1_AUDIO | STREAM_TYPE_MPEG2_AUDIO)
}

/// The elementary streams discovered in a Program Map Table.
///
/// Only the first program's PMT is consulted (multi-program streams are a
/// non-goal); within it, the first occurrence of a recognized stream_type
/// wins and later duplicates of the same kind are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PmtInfo {
    /// PID carrying the video elementary stream, if one was found.
    pub video_pid: Option<u16>,
    /// PMT `stream_type` of the video stream (`STREAM_TYPE_AVC` or `STREAM_TYPE_HEVC`).
    pub video_stream_type: Option<u8>,
    /// PID carrying the audio elementary stream, if one was found.
    pub audio_pid: Option<u16>,
    /// PMT `stream_type` of the audio stream.
    pub audio_stream_type: Option<u8>,
    /// PID carrying ID3 timed metadata, if present.
    pub id3_pid: Option<u16>,
}
