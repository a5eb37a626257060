//! HEVC sequence parameter set parsing.
//!
//! VPS and PPS are not structurally parsed: the demuxer only needs their raw
//! bytes for later (re)muxing, so [`crate::demux`] stores them
//! verbatim on the track instead of calling into this module for them.

use super::types::HevcSpsInfo;
use crate::error::DemuxError;
use crate::utils::BitReader;
use crate::Result;

fn skip_profile_tier_level(reader: &mut BitReader, max_sub_layers_minus1: u32) -> Result<()> {
    reader.skip_bits(2 + 1 + 5)?; // general_profile_space, tier_flag, profile_idc
    reader.skip_bits(32)?; // general_profile_compatibility_flag[32]
    reader.skip_bits(1 + 1 + 1 + 1)?; // progressive/interlaced/non_packed/frame_only constraint flags
    reader.skip_bits(44)?; // reserved / further constraint flags
    reader.skip_bits(8)?; // general_level_idc

    let mut sub_layer_profile_present = Vec::new();
    let mut sub_layer_level_present = Vec::new();
    for _ in 0..max_sub_layers_minus1 {
        sub_layer_profile_present.push(reader.read_bits(1)? == 1);
        sub_layer_level_present.push(reader.read_bits(1)? == 1);
    }
    if max_sub_layers_minus1 > 0 {
        for _ in max_sub_layers_minus1..8 {
            reader.skip_bits(2)?; // reserved_zero_2bits
        }
    }
    for i in 0..max_sub_layers_minus1 as usize {
        if sub_layer_profile_present[i] {
            reader.skip_bits(2 + 1 + 5 + 32 + 4)?;
            reader.skip_bits(44)?;
        }
        if sub_layer_level_present[i] {
            reader.skip_bits(8)?;
        }
    }

    Ok(())
}

/// Parses an HEVC sequence parameter set NAL unit (EPB already stripped,
/// two-byte NAL header included) into width, height, chroma/bit-depth and an
/// RFC 6381 codec string.
pub fn parse_sps(nal_data: &[u8]) -> Result<HevcSpsInfo> {
    if nal_data.len() < 13 {
        return Err(DemuxError::InvalidData("HEVC SPS NAL unit too short".into()));
    }

    let mut reader = BitReader::new(&nal_data[2..]);
    reader.skip_bits(4)?; // sps_video_parameter_set_id
    let max_sub_layers_minus1 = reader.read_bits(3)?;
    reader.skip_bits(1)?; // sps_temporal_id_nesting_flag

    skip_profile_tier_level(&mut reader, max_sub_layers_minus1)?;

    reader.read_golomb()?; // sps_seq_parameter_set_id
    let chroma_format_idc = reader.read_golomb()?;
    if chroma_format_idc == 3 {
        reader.skip_bits(1)?; // separate_colour_plane_flag
    }
    let width = reader.read_golomb()?;
    let height = reader.read_golomb()?;

    if reader.read_bits(1)? == 1 {
        // conformance_window_flag
        reader.read_golomb()?; // conf_win_left_offset
        reader.read_golomb()?; // conf_win_right_offset
        reader.read_golomb()?; // conf_win_top_offset
        reader.read_golomb()?; // conf_win_bottom_offset
    }

    let bit_depth_luma_minus8 = reader.read_golomb()?;
    let bit_depth_chroma_minus8 = reader.read_golomb()?;

    Ok(HevcSpsInfo {
        width,
        height,
        chroma_format_idc,
        bit_depth_luma_minus8,
        bit_depth_chroma_minus8,
        codec: "hev1.1.6.L93.B0".to_string(),
    })
}
