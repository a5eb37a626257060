//! # Utility Functions and Types
//!
//! Bit-level reading (used by the parameter-set parsers) and MPEG-2 CRC32
//! (used by the PSI table test fixtures).
//!
//! ```
//! use tsdemux::utils::BitReader;
//!
//! let data = vec![0b10110011u8];
//! let mut reader = BitReader::new(&data);
//! let value = reader.read_bits(3).unwrap();
//! assert_eq!(value, 0b101);
//! ```

/// Bit manipulation and bitstream reading utilities
pub mod bits;

/// CRC calculation implementations
pub mod crc;

pub use bits::BitReader;
pub use crc::Crc32Mpeg2;
