//! ADTS (AAC) frame header parsing.

/// Syncword search and header field parsing.
pub mod parser;
/// The parsed ADTS header record.
pub mod types;

pub use parser::{find_syncword, parse_header};
pub use types::AdtsHeader;
