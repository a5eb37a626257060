//! # Media Container Format Parsing
//!
//! Wire-format parsing for the one container this crate understands: MPEG-2
//! Transport Stream. The module boundary mirrors this codebase's historical
//! split between format parsing (`format::ts`) and the driver that consumes
//! it (`crate::demux`), previously occupied by RTSP/RTP/RTCP transport code.

/// MPEG-2 Transport Stream (TS) packet, PSI and PES parsing.
pub mod ts;
