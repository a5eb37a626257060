//! ADTS syncword search and header parsing.
//!
//! Stateless by design: the overflow-byte carry across PES boundaries and
//! the cumulative-PTS bookkeeping that use these primitives live in
//! [`crate::demux`], which is the only component that has the
//! track's timeline to compute against.

use super::types::AdtsHeader;
use crate::error::DemuxError;
use crate::utils::BitReader;
use crate::Result;

/// Finds the first ADTS syncword (12 set bits, `0xFFFx`) in `data`, if any.
pub fn find_syncword(data: &[u8]) -> Option<usize> {
    if data.len() < 2 {
        return None;
    }
    (0..=data.len() - 2).find(|&i| data[i] == 0xFF && (data[i + 1] & 0xF0) == 0xF0)
}

/// Parses a 7-byte ADTS fixed+variable header starting at `data[0]`.
///
/// `data` must have at least 7 bytes; the caller is responsible for slicing
/// from a syncword found by [`find_syncword`].
pub fn parse_header(data: &[u8]) -> Result<AdtsHeader> {
    if data.len() < 7 {
        return Err(DemuxError::InvalidData("ADTS header too short".into()));
    }

    let mut reader = BitReader::new(data);
    let sync_word = reader.read_bits(12)?;
    if sync_word != 0xFFF {
        return Err(DemuxError::InvalidData("invalid ADTS syncword".into()));
    }

    let id = reader.read_bits(1)? as u8;
    reader.skip_bits(2)?; // layer, always 0
    let protection_absent = reader.read_bits(1)? == 1;
    let profile = reader.read_bits(2)? as u8;
    let sample_rate_index = reader.read_bits(4)? as u8;
    reader.skip_bits(1)?; // private_bit
    let channel_configuration = reader.read_bits(3)? as u8;
    reader.skip_bits(1 + 1 + 1 + 1)?; // original/copy, home, copyright_id_bit, copyright_id_start
    let frame_length = reader.read_bits(13)? as u16;
    reader.skip_bits(11)?; // buffer_fullness
    let number_of_raw_blocks = reader.read_bits(2)? as u8;

    Ok(AdtsHeader {
        id,
        profile,
        sample_rate_index,
        channel_configuration,
        protection_absent,
        frame_length,
        number_of_raw_blocks,
    })
}
