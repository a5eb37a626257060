#![doc(html_root_url = "https://docs.rs/tsdemux/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # tsdemux
//!
//! `tsdemux` extracts AVC/HEVC video, AAC/MPEG Layer I/II/III audio, ID3
//! timed metadata and CEA-608 captions from an MPEG-2 Transport Stream as
//! timestamped access units, ready for a downstream fragmented-MP4 remuxer.
//!
//! ## Module Overview
//!
//! - [`demux`]: the synchronous [`demux::TsDemuxer`] driver — PID dispatch,
//!   PES reassembly, access-unit boundary detection and PTS bookkeeping.
//! - [`format::ts`]: stateless wire-format parsing (PAT/PMT, PES headers).
//! - [`codec`]: bitstream parsing for AVC/HEVC parameter sets and slice
//!   headers, ADTS and MPEG audio frame headers.
//! - [`track`]: the output-side data model (`VideoTrack`, `AudioTrack`,
//!   `Id3Track`, `TextTrack`) and their sample types.
//! - [`remux`]: the [`remux::RemuxSink`] and [`remux::DemuxObserver`] traits
//!   an embedder implements to receive demuxed tracks and errors.
//! - [`config`]: [`config::DemuxerConfig`] and [`config::TypeSupported`].
//! - [`error`]: [`error::DemuxError`] and the crate's [`Result`] alias.
//!
//! ## Quick Start
//!
//! ```
//! use tsdemux::config::{DemuxerConfig, TypeSupported};
//! use tsdemux::demux::TsDemuxer;
//! use tsdemux::remux::{DemuxEvent, DemuxObserver, RemuxSink};
//! use tsdemux::track::{AudioTrack, Id3Track, TextTrack, VideoTrack};
//!
//! struct NoopSink;
//! impl RemuxSink for NoopSink {
//!     fn remux(
//!         &mut self,
//!         _audio: &AudioTrack,
//!         _video: &VideoTrack,
//!         _id3: &Id3Track,
//!         _text: &TextTrack,
//!         _time_offset: f64,
//!         _contiguous: bool,
//!         _accurate_time_offset: bool,
//!     ) {
//!     }
//! }
//!
//! struct StderrObserver;
//! impl DemuxObserver for StderrObserver {
//!     fn trigger(&mut self, event: DemuxEvent) {
//!         eprintln!("{:?}", event);
//!     }
//! }
//!
//! let mut demuxer = TsDemuxer::new(
//!     Box::new(StderrObserver),
//!     Box::new(NoopSink),
//!     DemuxerConfig::default(),
//!     TypeSupported::default(),
//! );
//!
//! let buffer: Vec<u8> = Vec::new(); // bytes read from a TS source
//! if TsDemuxer::probe(&buffer) {
//!     demuxer.push(&buffer, 0.0, None, false);
//! }
//! ```

/// Elementary-stream codec bitstream parsing (AVC/HEVC, ADTS, MPEG audio).
pub mod codec;
/// Configuration types for the demuxer and its embedder.
pub mod config;
/// The synchronous TS demultiplexing driver.
pub mod demux;
/// Error types and the crate's `Result` alias.
pub mod error;
/// MPEG-2 Transport Stream wire-format parsing.
pub mod format;
/// Remux sink and error observer traits an embedder implements.
pub mod remux;
/// The output-side track and sample data model.
pub mod track;
/// Bit-level reading and CRC32 helpers shared across parsers.
pub mod utils;

pub use error::{DemuxError, Result};
