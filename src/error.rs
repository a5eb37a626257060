//! # Error Types
//!
//! This module provides the error types used throughout the `tsdemux` library.
//! `DemuxError` is used internally by bitstream-level helpers (Exp-Golomb
//! reading, parameter-set parsing, PSI table parsing) that can genuinely fail
//! on malformed input. The top-level [`crate::demux::TsDemuxer`] never
//! propagates these as a hard failure from `push()`; it catches them at the
//! call site and reports them through the observer instead (see
//! [`crate::remux::DemuxObserver`]).
//!
//! ## Example Usage
//!
//! ```rust
//! use tsdemux::error::{Result, DemuxError};
//!
//! fn parse_sps_id(data: &[u8]) -> Result<u8> {
//!     if data.is_empty() {
//!         return Err(DemuxError::InvalidData("empty SPS payload".to_string()));
//!     }
//!     Ok(data[0])
//! }
//! ```

use std::num::ParseIntError;
use thiserror::Error;

/// Primary error type for the tsdemux library
#[derive(Error, Debug)]
pub enum DemuxError {
    /// I/O errors that occur while reading configuration or template files
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to codec bitstream parsing (SPS/PPS/VPS, ADTS, MPEG audio headers)
    #[error("codec error: {0}")]
    Codec(String),

    /// Errors for invalid or malformed input data
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Errors that occur during integer parsing (configuration values)
    #[error("parse int error: {0}")]
    ParseInt(#[from] ParseIntError),
}

/// A specialized Result type for tsdemux operations.
pub type Result<T> = std::result::Result<T, DemuxError>;
