//! PES (Packetized Elementary Stream) header parsing.

use bytes::{Bytes, BytesMut};
use log::warn;

const PTS_DTS_MAX_GAP: i64 = 60 * 90_000;

/// A parsed PES packet: its payload plus presentation/decode timestamps.
#[derive(Debug, Clone)]
pub struct PesInfo {
    /// Payload bytes, PES header stripped.
    pub data: Bytes,
    /// Presentation timestamp, 90 kHz.
    pub pts: i64,
    /// Decode timestamp, 90 kHz.
    pub dts: i64,
}

fn read_timestamp(b: &[u8]) -> i64 {
    // b[0..5] holds a 5-byte PTS/DTS field: marker bits interleaved with a
    // 33-bit value split 3/15/15 across the five bytes.
    let raw = ((b[0] & 0x0E) as u64) << 29
        | (b[1] as u64) << 22
        | ((b[2] & 0xFE) as u64) << 14
        | (b[3] as u64) << 7
        | ((b[4] & 0xFE) as u64) >> 1;

    if raw > u32::MAX as u64 {
        raw as i64 - (1i64 << 33)
    } else {
        raw as i64
    }
}

/// Concatenates `slices` (successive TS payload fragments of one PID) and
/// parses the leading PES header, returning the payload with extracted
/// timing. Returns `None` on any structural problem: missing start code
/// prefix, a truncated declared `pes_len`, or too few bytes to hold the
/// fixed PES header.
pub fn parse_pes(slices: &[Bytes], total_size: usize) -> Option<PesInfo> {
    let mut buf = BytesMut::with_capacity(total_size);
    for slice in slices {
        buf.extend_from_slice(slice);
    }
    let buf = buf.freeze();

    if buf.len() < 9 {
        return None;
    }

    let start_code_prefix = ((buf[0] as u32) << 16) | ((buf[1] as u32) << 8) | buf[2] as u32;
    if start_code_prefix != 1 {
        return None;
    }

    let pes_len = ((buf[4] as usize) << 8) | buf[5] as usize;
    if pes_len != 0 && pes_len > buf.len().saturating_sub(6) {
        return None;
    }

    let flags = buf[7];
    let hdr_len = buf[8] as usize;
    if buf.len() < 9 + hdr_len {
        return None;
    }

    let mut pts = 0i64;
    let mut dts;
    if flags & 0xC0 != 0 {
        if buf.len() < 14 {
            return None;
        }
        pts = read_timestamp(&buf[9..14]);
    }
    dts = pts;
    if flags & 0x40 != 0 {
        if buf.len() < 19 {
            return None;
        }
        dts = read_timestamp(&buf[14..19]);
    }

    if pts - dts > PTS_DTS_MAX_GAP {
        warn!("PTS/DTS gap {} exceeds 60s, forcing PTS = DTS", pts - dts);
        pts = dts;
    }

    Some(PesInfo {
        data: buf.slice(9 + hdr_len..),
        pts,
        dts,
    })
}
