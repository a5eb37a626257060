//! # Configuration
//!
//! Two layers of configuration exist, mirroring the split this codebase has
//! always used between call-site options and process-wide defaults:
//!
//! - [`DemuxerConfig`] / [`TypeSupported`] are constructed by the embedder and
//!   passed into [`crate::demux::TsDemuxer::new`]. They are the only
//!   configuration the demuxer itself reads.
//! - [`get_force_key_frame_on_discontinuity`] exposes a process-wide default
//!   (env-var overridable) for embedders that want a sensible value without
//!   wiring one through explicitly, following the lazy-static/env-var pattern
//!   this crate has historically used for its global defaults.

use lazy_static::lazy_static;
use std::env;
use std::sync::RwLock;

/// Options controlling how the demuxer handles discontinuities.
#[derive(Debug, Clone, Copy)]
pub struct DemuxerConfig {
    /// When true, video access units arriving before a parameter set is
    /// known (or immediately after a discontinuity) and lacking a keyframe
    /// NAL are dropped rather than forwarded.
    pub force_key_frame_on_discontinuity: bool,
}

impl Default for DemuxerConfig {
    fn default() -> Self {
        Self {
            force_key_frame_on_discontinuity: get_force_key_frame_on_discontinuity(),
        }
    }
}

/// Hints about which optional codec families the embedding player can decode.
///
/// The demuxer itself always parses whatever it finds in the PMT; these
/// hints are consulted only to choose between equivalent presentations
/// (e.g. HE-AAC SBR upsampling vs. plain LC-AAC) and never gate whether a
/// stream type is demuxed at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeSupported {
    /// Whether the player can decode HEVC video.
    pub hevc: bool,
    /// Whether the player can decode MPEG-1/2 Layer II/III audio directly.
    pub mpeg_audio: bool,
}

lazy_static! {
    static ref FORCE_KEY_FRAME_ON_DISCONTINUITY: RwLock<bool> = RwLock::new(
        env::var("TSDEMUX_FORCE_KEY_FRAME_ON_DISCONTINUITY")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(true)
    );
}

/// Returns the process-wide default for [`DemuxerConfig::force_key_frame_on_discontinuity`].
pub fn get_force_key_frame_on_discontinuity() -> bool {
    *FORCE_KEY_FRAME_ON_DISCONTINUITY.read().unwrap()
}

/// Overrides the process-wide default, e.g. from an embedder's own config file.
pub fn set_force_key_frame_on_discontinuity(value: bool) {
    *FORCE_KEY_FRAME_ON_DISCONTINUITY.write().unwrap() = value;
}
