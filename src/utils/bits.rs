use crate::error::DemuxError;
use crate::Result;

/// MSB-first bit reader over a byte slice, with Exp-Golomb decoding.
///
/// Used by the AVC/HEVC parameter-set parsers to walk SPS/PPS/VPS payloads
/// that have already had emulation-prevention bytes removed.
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    bit_position: u8,
}

impl<'a> BitReader<'a> {
    /// Wraps `data` for bit-at-a-time reading starting at bit 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            bit_position: 0,
        }
    }

    /// Reads `count` (<=32) bits MSB-first and advances the cursor.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        if count > 32 {
            return Err(DemuxError::InvalidData("cannot read more than 32 bits".into()));
        }

        let mut result = 0u32;
        let mut bits_left = count;

        while bits_left > 0 {
            if self.position >= self.data.len() {
                return Err(DemuxError::InvalidData("reached end of data".into()));
            }

            let byte = self.data[self.position];
            let bits_in_byte = 8 - self.bit_position;
            let bits_to_read = bits_in_byte.min(bits_left);

            let mask = ((1u16 << bits_to_read) - 1) as u8;
            let shifted = (byte >> (8 - self.bit_position - bits_to_read)) & mask;

            result = (result << bits_to_read) | shifted as u32;

            self.bit_position += bits_to_read;
            if self.bit_position >= 8 {
                self.position += 1;
                self.bit_position = 0;
            }

            bits_left -= bits_to_read;
        }

        Ok(result)
    }

    /// Reads an unsigned Exp-Golomb code: `n` leading zero bits, a `1`, then
    /// `n` trailing bits, decoding to `(1<<n) - 1 + trailing`.
    pub fn read_golomb(&mut self) -> Result<u32> {
        let mut leading_zeros = 0u32;

        while self.read_bits(1)? == 0 {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return Err(DemuxError::InvalidData("exp-golomb prefix too long".into()));
            }
        }

        if leading_zeros == 0 {
            return Ok(0);
        }

        let remaining = self.read_bits(leading_zeros as u8)?;
        Ok((1 << leading_zeros) - 1 + remaining)
    }

    /// Reads a signed Exp-Golomb code (`ue(v)` mapped to alternating signs).
    pub fn read_signed_golomb(&mut self) -> Result<i32> {
        let code = self.read_golomb()?;
        let sign = (code & 1) == 1;
        let abs = (code + 1) >> 1;
        Ok(if sign { abs as i32 } else { -(abs as i32) })
    }

    /// Skips `count` bits without decoding them.
    pub fn skip_bits(&mut self, count: u32) -> Result<()> {
        let new_pos = self.position * 8 + self.bit_position as usize + count as usize;
        self.position = new_pos / 8;
        self.bit_position = (new_pos % 8) as u8;

        if self.position > self.data.len() {
            return Err(DemuxError::InvalidData("attempted to skip past end of data".into()));
        }

        Ok(())
    }

    /// Advances to the next byte boundary, discarding any partial byte.
    #[allow(dead_code)]
    pub fn align_to_byte(&mut self) {
        if self.bit_position > 0 {
            self.position += 1;
            self.bit_position = 0;
        }
    }

    /// Bytes remaining at the current (byte-aligned) position.
    pub fn bytes_remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }
}
