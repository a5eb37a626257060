//! # Elementary Stream Codec Parsing
//!
//! Bitstream-level parsing for the payload types this demuxer understands:
//! AVC/HEVC parameter sets and slice headers, ADTS and MPEG Layer I/II/III
//! audio frame headers. NAL unit extraction from Annex-B-framed video is
//! shared between AVC and HEVC in [`annexb`].

/// ADTS (AAC) frame header parsing.
pub mod aac;
/// Annex-B NAL unit scanning, shared by the AVC and HEVC parsers.
pub mod annexb;
/// AVC (H.264) sequence parameter set parsing.
pub mod h264;
/// HEVC (H.265) sequence parameter set parsing.
pub mod h265;
/// MPEG-1/2 Layer I/II/III audio frame header parsing.
pub mod mpegaudio;
