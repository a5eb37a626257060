//! HEVC NAL unit type constants (Table 7-1 of ITU-T H.265) and the parsed
//! SPS configuration record.

/// Coded slice segment of a non-TSA, non-STSA trailing picture, non-reference.
pub const NAL_TRAIL_N: u8 = 0;
/// Coded slice segment of a non-TSA, non-STSA trailing picture, reference.
pub const NAL_TRAIL_R: u8 = 1;
pub const NAL_TSA_N: u8 = 2;
pub const NAL_TSA_R: u8 = 3;
pub const NAL_STSA_N: u8 = 4;
pub const NAL_STSA_R: u8 = 5;
pub const NAL_RADL_N: u8 = 6;
pub const NAL_RADL_R: u8 = 7;
pub const NAL_RASL_N: u8 = 8;
pub const NAL_RASL_R: u8 = 9;
/// Broken link access, leading pictures present, not decodable.
pub const NAL_BLA_W_LP: u8 = 16;
pub const NAL_BLA_W_RADL: u8 = 17;
pub const NAL_BLA_N_LP: u8 = 18;
/// IDR picture, RADL pictures may follow.
pub const NAL_IDR_W_RADL: u8 = 19;
/// IDR picture, no leading pictures.
pub const NAL_IDR_N_LP: u8 = 20;
/// Clean random access picture.
pub const NAL_CRA_NUT: u8 = 21;
pub const NAL_VPS: u8 = 32;
pub const NAL_SPS: u8 = 33;
pub const NAL_PPS: u8 = 34;
pub const NAL_AUD: u8 = 35;
pub const NAL_EOS: u8 = 36;
pub const NAL_EOB: u8 = 37;
pub const NAL_FD: u8 = 38;
pub const NAL_PREFIX_SEI: u8 = 39;
pub const NAL_SUFFIX_SEI: u8 = 40;

/// VCL NAL types whose reference flag marks them key-eligible for this
/// demuxer's bookkeeping: the `_R` (reference) trailing/TSA/STSA/RADL/RASL
/// types, plus every IDR and CRA type.
pub const KEYFRAME_NAL_TYPES: [u8; 8] = [
    NAL_TRAIL_R,
    NAL_TSA_R,
    NAL_STSA_R,
    NAL_RADL_R,
    NAL_RASL_R,
    NAL_IDR_W_RADL,
    NAL_IDR_N_LP,
    NAL_CRA_NUT,
];

/// True if `nal_type` is one of the coded-slice VCL types (0-31).
pub fn is_vcl(nal_type: u8) -> bool {
    nal_type <= 31
}

/// True if `nal_type` marks a picture this demuxer treats as a keyframe.
pub fn is_keyframe_nal_type(nal_type: u8) -> bool {
    KEYFRAME_NAL_TYPES.contains(&nal_type)
}

/// Configuration record parsed out of a single HEVC sequence parameter set.
#[derive(Debug, Clone)]
pub struct HevcSpsInfo {
    /// Coded picture width in luma samples.
    pub width: u32,
    /// Coded picture height in luma samples.
    pub height: u32,
    /// Chroma sampling format (1 = 4:2:0, the overwhelming majority of streams).
    pub chroma_format_idc: u32,
    /// `bit_depth_luma_minus8`.
    pub bit_depth_luma_minus8: u32,
    /// `bit_depth_chroma_minus8`.
    pub bit_depth_chroma_minus8: u32,
    /// RFC 6381 codec string. This crate does not decode the full profile/tier/
    /// level syntax, so a fixed Main-profile-compatible string is reported.
    pub codec: String,
}
