//! HEVC (H.265) sequence parameter set parsing and NAL unit type constants.
//!
//! As with [`crate::codec::h264`], NAL extraction itself is handled by the
//! shared [`crate::codec::annexb::AnnexBScanner`].

/// SPS parsing.
pub mod parser;
/// NAL unit type constants and the parsed SPS configuration record.
pub mod types;

pub use parser::parse_sps;
pub use types::HevcSpsInfo;
