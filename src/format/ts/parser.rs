//! PAT and PMT table parsing.
//!
//! Both functions take the TS payload starting at the section's pointer
//! field (when `pusi` is set) or continuation bytes (when it is not) and
//! return `None` on any structural inconsistency rather than panicking —
//! malformed PSI tables are common in the wild and must not crash the
//! scanner that calls these.

use super::types::{
    is_mpeg_audio_stream_type, PmtInfo, STREAM_TYPE_AAC, STREAM_TYPE_AVC, STREAM_TYPE_HEVC,
    STREAM_TYPE_ID3,
};

fn skip_pointer_field(payload: &[u8], pusi: bool) -> Option<usize> {
    if !pusi {
        return Some(0);
    }
    let pointer = *payload.first()? as usize;
    Some(pointer + 1)
}

/// Parses a PAT section, returning the first program's PMT PID. Multi-program
/// PATs are ignored beyond their first entry.
pub fn parse_pat(payload: &[u8], pusi: bool) -> Option<u16> {
    let off = skip_pointer_field(payload, pusi)?;
    if payload.len() < off + 12 {
        return None;
    }
    let pmt_pid = ((payload[off + 10] as u16 & 0x1F) << 8) | payload[off + 11] as u16;
    Some(pmt_pid)
}

/// Parses a PMT section into the elementary streams it describes.
pub fn parse_pmt(payload: &[u8], pusi: bool) -> Option<PmtInfo> {
    let off0 = skip_pointer_field(payload, pusi)?;
    if payload.len() < off0 + 12 {
        return None;
    }

    let section_length = (((payload[off0 + 1] & 0x0F) as usize) << 8) | payload[off0 + 2] as usize;
    let table_end = off0 + 3 + section_length;
    if table_end < 4 || table_end > payload.len() {
        return None;
    }
    let table_end = table_end - 4; // trailing CRC32

    let program_info_length =
        (((payload[off0 + 10] & 0x0F) as usize) << 8) | payload[off0 + 11] as usize;
    let mut off = off0 + 12 + program_info_length;

    let mut info = PmtInfo::default();
    while off + 5 <= table_end && off + 5 <= payload.len() {
        let stream_type = payload[off];
        let pid = ((payload[off + 1] as u16 & 0x1F) << 8) | payload[off + 2] as u16;
        let es_info_length =
            (((payload[off + 3] & 0x0F) as usize) << 8) | payload[off + 4] as usize;

        match stream_type {
            STREAM_TYPE_AVC | STREAM_TYPE_HEVC => {
                if info.video_pid.is_none() {
                    info.video_pid = Some(pid);
                    info.video_stream_type = Some(stream_type);
                }
            }
            STREAM_TYPE_AAC => {
                if info.audio_pid.is_none() {
                    info.audio_pid = Some(pid);
                    info.audio_stream_type = Some(stream_type);
                }
            }
            st if is_mpeg_audio_stream_type(st) => {
                if info.audio_pid.is_none() {
                    info.audio_pid = Some(pid);
                    info.audio_stream_type = Some(stream_type);
                }
            }
            STREAM_TYPE_ID3 => {
                if info.id3_pid.is_none() {
                    info.id3_pid = Some(pid);
                }
            }
            _ => {}
        }

        off += 5 + es_info_length;
    }

    Some(info)
}
