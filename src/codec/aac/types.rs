//! ADTS (Audio Data Transport Stream) frame header.

/// Fixed 7-byte ADTS header, with `protection_absent` the only factor in
/// whether a 2-byte CRC follows it (never parsed; the frame payload offset
/// accounts for it through `header_len`).
#[derive(Debug, Clone, Copy)]
pub struct AdtsHeader {
    /// 1 bit: 0 = MPEG-4, 1 = MPEG-2.
    pub id: u8,
    /// `profile` field (2 bits); AAC object type is `profile + 1`.
    pub profile: u8,
    /// 4-bit index into the standard sampling-frequency table.
    pub sample_rate_index: u8,
    /// 3-bit channel configuration (number of channels, with 7 meaning 8).
    pub channel_configuration: u8,
    /// Whether the 2-byte CRC is absent (if false, payload starts 2 bytes later).
    pub protection_absent: bool,
    /// Total frame length in bytes, header included (13 bits).
    pub frame_length: u16,
    /// `number_of_raw_data_blocks_in_frame` (2 bits); this crate only
    /// supports the common case of 0 (a single AAC frame per ADTS frame).
    pub number_of_raw_blocks: u8,
}

impl AdtsHeader {
    /// Header size in bytes: 7, or 9 when a CRC follows.
    pub fn header_len(&self) -> usize {
        if self.protection_absent {
            7
        } else {
            9
        }
    }

    /// Sampling frequency in Hz for `sample_rate_index`, per ISO/IEC 13818-7
    /// Table 1.18. `None` for the three reserved indices (13-15).
    pub fn sample_rate(&self) -> Option<u32> {
        sampling_frequency(self.sample_rate_index)
    }

    /// AAC audio object type (MPEG-4 `AudioObjectType`): ADTS `profile + 1`.
    pub fn object_type(&self) -> u8 {
        self.profile + 1
    }

    /// RFC 6381 codec string, e.g. `"mp4a.40.2"` for AAC-LC.
    pub fn codec_string(&self) -> String {
        format!("mp4a.40.{}", self.object_type())
    }
}

/// Sampling frequency in Hz for a 4-bit ADTS `sampling_frequency_index`.
pub fn sampling_frequency(index: u8) -> Option<u32> {
    const TABLE: [u32; 13] = [
        96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
    ];
    TABLE.get(index as usize).copied()
}
