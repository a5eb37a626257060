//! NAL unit type constants and the AVC parameter-set configuration record.

/// Coded slice, not an IDR picture.
pub const NAL_SLICE: u8 = 1;
/// Coded slice of an IDR picture.
pub const NAL_IDR: u8 = 5;
/// Supplemental enhancement information.
pub const NAL_SEI: u8 = 6;
/// Sequence parameter set.
pub const NAL_SPS: u8 = 7;
/// Picture parameter set.
pub const NAL_PPS: u8 = 8;
/// Access unit delimiter.
pub const NAL_AUD: u8 = 9;
/// Filler data.
pub const NAL_FILLER: u8 = 12;

/// `slice_type` values (mod 5) that mark a picture codeable without any
/// reference, per Table 7-6: I(2), SI(4), I(7), SI(9).
pub const KEYFRAME_SLICE_TYPES: [u32; 4] = [2, 4, 7, 9];

/// Configuration record parsed out of a single AVC sequence parameter set.
#[derive(Debug, Clone)]
pub struct AvcSpsInfo {
    /// Coded picture width in luma samples.
    pub width: u32,
    /// Coded picture height in luma samples.
    pub height: u32,
    /// Sample aspect ratio `(h_spacing, v_spacing)`, when `aspect_ratio_info`
    /// is present in the VUI parameters.
    pub pixel_ratio: Option<(u32, u32)>,
    /// RFC 6381 codec string, e.g. `"avc1.640028"`.
    pub codec: String,
}

/// Table E-1 of the AVC spec: `aspect_ratio_idc` to `(sar_width, sar_height)`
/// for every value below `Extended_SAR` (255).
pub const ASPECT_RATIO_TABLE: [(u32, u32); 17] = [
    (0, 0), // 0: Unspecified
    (1, 1),
    (12, 11),
    (10, 11),
    (16, 11),
    (40, 33),
    (24, 11),
    (20, 11),
    (32, 11),
    (80, 33),
    (18, 11),
    (15, 11),
    (64, 33),
    (160, 99),
    (4, 3),
    (3, 2),
    (2, 1),
];
