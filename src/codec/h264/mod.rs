//! AVC (H.264) sequence parameter set parsing.
//!
//! NAL unit extraction from a PES payload is handled by
//! [`crate::codec::annexb::AnnexBScanner`], which is codec-agnostic; this
//! module only parses the parameter-set and slice-header fields that differ
//! between AVC and HEVC.
//!
//! ```
//! use tsdemux::codec::h264::parser::parse_sps;
//! ```

/// SPS and slice-header parsing.
pub mod parser;
/// NAL unit type constants and the parsed SPS configuration record.
pub mod types;

pub use parser::{is_keyframe_slice_type, parse_slice_type, parse_sps};
pub use types::AvcSpsInfo;
