//! # Remux and Observer Interfaces
//!
//! The fragmented-MP4 remuxer and the surrounding player's error/event
//! reporting are external collaborators, not part of this crate. Both are
//! modelled as thin synchronous traits the demuxer calls into directly (no
//! `async_trait`, matching the synchronous driver model in
//! [`crate::demux`]); an embedder wires up its own implementation.

use crate::track::{AudioTrack, Id3Track, TextTrack, VideoTrack};

/// Receives demuxed tracks at PES/access-unit boundaries.
///
/// Implemented by the (out of scope) fragmented-MP4 remuxer. The demuxer
/// calls `remux` once per `push()` call, after every pending PES has been
/// flushed for every known track.
pub trait RemuxSink {
    /// Hands off the samples accumulated since the previous call.
    ///
    /// `contiguous` is true when the caller-supplied continuity counter was
    /// adjacent to the previous call's; `accurate_time_offset` is threaded
    /// straight through from the `push()` caller with no reinterpretation.
    fn remux(
        &mut self,
        audio_track: &AudioTrack,
        video_track: &VideoTrack,
        id3_track: &Id3Track,
        text_track: &TextTrack,
        time_offset: f64,
        contiguous: bool,
        accurate_time_offset: bool,
    );

    /// When true, the demuxer may stop after codec identification and skip
    /// sample extraction entirely (used by callers that only need track
    /// metadata, e.g. for level switching).
    fn passthrough(&self) -> bool {
        false
    }
}

/// Broad category of a reported error. Only `MediaError` is produced by this
/// crate's core; the variant exists so observers can distinguish demuxer
/// errors from unrelated errors an embedder may also report through the same
/// sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An error originating from media parsing (this crate's only kind).
    MediaError,
}

/// Specific reason within [`ErrorKind::MediaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDetail {
    /// A TS packet, PES header, or codec bitstream did not parse as expected.
    FragParsingError,
}

/// One reportable condition raised while demultiplexing.
#[derive(Debug, Clone)]
pub struct DemuxEvent {
    /// Broad category (always [`ErrorKind::MediaError`] today).
    pub kind: ErrorKind,
    /// Specific reason (always [`ErrorDetail::FragParsingError`] today).
    pub details: ErrorDetail,
    /// When true, the current `push()` call was aborted and no remux
    /// happened for this fragment; when false, parsing recovered and
    /// continued.
    pub fatal: bool,
    /// Human-readable detail, e.g. `"no ADTS header found in AAC PES"`.
    pub reason: String,
}

/// Receives non-fatal and fatal demuxing errors.
///
/// Implemented by the embedding player. Errors reported here never
/// correspond to a Rust panic: they are expected, recoverable conditions in
/// untrusted byte streams.
pub trait DemuxObserver {
    /// Called once per reportable condition.
    fn trigger(&mut self, event: DemuxEvent);
}
