//! # Annex-B NAL Unit Scanner
//!
//! Shared by the AVC and HEVC parsers: both frame their bitstreams with
//! `0x000001`/`0x00000001` start codes and differ only in how many bits of
//! the byte following the start code encode the NAL unit type. The scanner
//! is fed successive PES payload slices and keeps the NAL unit whose
//! terminating start code has not yet arrived ("open") across calls, so a
//! unit split across two `push()` calls is reported once, intact, on the
//! call where its end is found.

use crate::track::NalUnit;
use bytes::{BufMut, Bytes, BytesMut};

/// Cross-call Annex-B scanning state for one elementary stream.
#[derive(Debug, Default)]
pub struct AnnexBScanner {
    /// Trailing bytes held back because they might be the unterminated
    /// prefix of a start code split across a buffer boundary.
    tail: Vec<u8>,
    /// NAL unit currently being accumulated; its terminating start code has
    /// not yet been found.
    open: Option<(u8, BytesMut)>,
    /// True when the previous call ended with a complete `00 00 01` start
    /// code in its final 3 bytes, with no header byte following it yet.
    /// Mirrors the degenerate scanner state described by spec.md's NAL
    /// Scanner State `-1`: the start code is already confirmed, only the
    /// type-bearing header byte is still pending.
    pending_header: bool,
}

impl AnnexBScanner {
    /// Creates an empty scanner with no pending state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `data` (the latest PES payload slice for this elementary
    /// stream), returning every NAL unit whose start and end were both
    /// found. The last, still-open NAL unit (if any) is retained internally
    /// and returned by a later call once its end is found.
    ///
    /// `nal_type_of` extracts the codec-specific type field from the byte
    /// immediately following a start code (AVC: `b & 0x1F`; HEVC:
    /// `(b >> 1) & 0x3F`).
    pub fn feed(&mut self, data: &[u8], nal_type_of: impl Fn(u8) -> u8) -> Vec<NalUnit> {
        let mut out = Vec::new();
        let mut data = data;

        if self.pending_header {
            if data.is_empty() {
                return out;
            }
            self.pending_header = false;
            let nal_type = nal_type_of(data[0]);
            let mut buf = BytesMut::new();
            buf.put_u8(data[0]); // NAL data includes its header byte, as elsewhere
            self.open = Some((nal_type, buf));
            data = &data[1..];
        }

        let mut combined = std::mem::take(&mut self.tail);
        combined.extend_from_slice(data);
        let n = combined.len();

        if n < 3 {
            self.tail = combined;
            return out;
        }

        // Offsets of `00 00 01` triples with a header byte already available
        // (i.e. not the final 0/1/2 bytes of the buffer).
        let mut start_codes = Vec::new();
        let mut i = 0;
        while i + 2 < n {
            if combined[i] == 0 && combined[i + 1] == 0 && combined[i + 2] == 1 && i + 3 < n {
                start_codes.push(i);
                i += 3;
            } else {
                i += 1;
            }
        }

        let mut cursor = 0usize;
        for sc in start_codes {
            if let Some((nal_type, mut buf)) = self.open.take() {
                buf.extend_from_slice(&combined[cursor..sc]);
                out.push(NalUnit::new(nal_type, buf.freeze()));
            }
            // Bytes before the very first start code (if any) are discarded:
            // they are leftover padding, not part of any NAL.
            let header_idx = sc + 3;
            let nal_type = nal_type_of(combined[header_idx]);
            self.open = Some((nal_type, BytesMut::new()));
            cursor = header_idx;
        }

        // A start code that completes exactly in the final 3 bytes has no
        // header byte available yet (the scan above requires `i + 3 < n`
        // precisely to exclude it). Losing track of it here would corrupt
        // the boundary NAL: the generic 2-byte holdback below would discard
        // its leading `0x00` and retain only `[0x00, 0x01]`, which can never
        // match `00 00 01` again. Instead close out whatever was open up to
        // this point and remember that the next `feed()` call begins with a
        // confirmed start code awaiting only its header byte.
        if cursor <= n - 3 && combined[n - 3] == 0 && combined[n - 2] == 0 && combined[n - 1] == 1 {
            if let Some((nal_type, mut buf)) = self.open.take() {
                buf.extend_from_slice(&combined[cursor..n - 3]);
                out.push(NalUnit::new(nal_type, buf.freeze()));
            }
            self.pending_header = true;
            self.tail.clear();
            return out;
        }

        // Hold back the final 2 bytes: they might be the start of a start
        // code whose completion arrives in the next call.
        let committed_end = n.saturating_sub(2).max(cursor);
        if let Some((_, ref mut buf)) = self.open {
            buf.extend_from_slice(&combined[cursor..committed_end]);
        }
        self.tail = combined[committed_end..].to_vec();

        out
    }

    /// Forces the currently open NAL unit (if any) to close, discarding any
    /// held-back tail bytes. Called on `reset_init_segment`/discontinuity;
    /// the returned unit, if present, should generally be discarded rather
    /// than emitted, since a discontinuity means its continuation is gone.
    pub fn flush(&mut self) -> Option<NalUnit> {
        self.tail.clear();
        self.pending_header = false;
        self.open
            .take()
            .map(|(nal_type, buf)| NalUnit::new(nal_type, buf.freeze()))
    }

    /// Drops all pending state without returning the open unit. Used on
    /// `reset_init_segment`.
    pub fn clear(&mut self) {
        self.tail.clear();
        self.open = None;
        self.pending_header = false;
    }
}

/// Extracts the EPB-free RBSP from a NAL payload, removing every `0x03`
/// that follows `0x00 0x00` (the emulation-prevention byte defined by
/// ITU-T H.264/H.265 Annex B).
pub fn remove_emulation_prevention(data: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(data.len());
    let mut zero_run = 0u8;
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if zero_run >= 2 && b == 0x03 {
            zero_run = 0;
            i += 1;
            continue;
        }
        out.put_u8(b);
        zero_run = if b == 0 { zero_run + 1 } else { 0 };
        i += 1;
    }
    out.freeze()
}
