//! # TS Demuxer
//!
//! [`TsDemuxer`] is the synchronous driver tying together PSI parsing
//! ([`crate::format::ts::parser`]), PES reassembly ([`crate::format::ts::pes`])
//! and elementary-stream bitstream parsing ([`crate::codec`]). It holds every
//! piece of state that must survive across `push()` calls: the learned PID
//! bindings, open PES accumulators, in-progress video access units, and the
//! AAC overflow/PTS bookkeeping.
//!
//! There is no `async_trait` here, unlike this codebase's RTSP/RTP
//! transport layer: a demuxer fed by a fixed, already-available byte buffer
//! has no I/O to await, so the driver is a plain synchronous state machine.
//! Threading and backpressure are the embedder's problem, not this crate's.

use bytes::Bytes;
use log::{debug, warn};

use crate::codec::aac;
use crate::codec::annexb::{remove_emulation_prevention, AnnexBScanner};
use crate::codec::h264;
use crate::codec::h265;
use crate::codec::mpegaudio::{self, MpegLayer};
use crate::config::{DemuxerConfig, TypeSupported};
use crate::format::ts::parser::{parse_pat, parse_pmt};
use crate::format::ts::pes::parse_pes;
use crate::format::ts::types::{
    PmtInfo, PID_NULL, PID_PAT, PID_SDT, STREAM_TYPE_AVC, STREAM_TYPE_HEVC, SYNC_BYTE,
    TS_PACKET_SIZE,
};
use crate::remux::{DemuxEvent, DemuxObserver, ErrorDetail, ErrorKind, RemuxSink};
use crate::track::{
    AudioSample, AudioTrack, CaptionSample, Id3Sample, Id3Track, NalUnit, TextTrack, VideoSample,
    VideoTrack,
};

/// Minimum number of consecutive 188-byte packets required for [`TsDemuxer::probe`]
/// to accept a buffer as Transport Stream.
const PROBE_PACKET_COUNT: usize = 3;

/// Collects raw TS payload bytes for one PID between PES boundaries.
#[derive(Debug, Default)]
struct PesAccumulator {
    slices: Vec<Bytes>,
    len: usize,
}

impl PesAccumulator {
    fn push(&mut self, payload: &[u8]) {
        self.slices.push(Bytes::copy_from_slice(payload));
        self.len += payload.len();
    }

    fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    fn take(&mut self) -> (Vec<Bytes>, usize) {
        let len = self.len;
        self.len = 0;
        (std::mem::take(&mut self.slices), len)
    }
}

/// Extracts elementary streams from an MPEG-2 Transport Stream.
///
/// One `TsDemuxer` is built per program and fed successive byte buffers
/// through [`push`](TsDemuxer::push). It learns its PAT/PMT PIDs from the
/// stream itself; packets seen for a not-yet-known PMT PID are not an error,
/// they simply contribute nothing until the PMT arrives — except that the
/// first time the PMT is learned within a `push()` call, if any packets on
/// still-unbound PIDs were already seen, the packet loop rewinds once to the
/// start of the buffer so those packets are reprocessed against the newly
/// learned bindings (see [`push`](TsDemuxer::push), P8).
pub struct TsDemuxer {
    observer: Box<dyn DemuxObserver>,
    remuxer: Box<dyn RemuxSink>,
    config: DemuxerConfig,
    #[allow(dead_code)]
    type_supported: TypeSupported,

    video: VideoTrack,
    audio: AudioTrack,
    id3: Id3Track,
    text: TextTrack,

    pmt_pid: Option<u16>,
    pmt_seen: bool,

    video_accum: PesAccumulator,
    audio_accum: PesAccumulator,
    id3_accum: PesAccumulator,

    avc_scanner: AnnexBScanner,
    hevc_scanner: AnnexBScanner,

    avc_sample: Option<VideoSample>,
    aud_found: bool,
    sps_found: bool,

    hevc_group: Vec<NalUnit>,
    hevc_group_key: bool,

    aac_overflow: Option<Vec<u8>>,
    aac_last_pts: Option<i64>,

    last_cc: Option<u8>,
    saw_unknown_pid: bool,

    /// Set by [`Self::apply_pmt`] when the PMT is learned for the first time
    /// and packets on still-unbound PIDs were already seen earlier in the
    /// current `push()` call. Consumed by the packet loop in [`Self::push`],
    /// which rewinds to `sync` once and clears this flag.
    pmt_rewind_pending: bool,
    /// Set once the packet loop has rewound for the current `push()` call,
    /// so a PMT re-parsed during the replay (its `first_pmt` check is now
    /// false) can never trigger a second rewind (P8: exactly one per call).
    rewound_this_push: bool,

    /// Set by [`Self::report_error`] when a fatal condition (currently only
    /// "no ADTS header found in AAC PES") is hit during the current
    /// `push()` call. Checked after every packet so the rest of the buffer
    /// is abandoned and the remuxer is not invoked for this fragment (§7).
    fatal_this_push: bool,
}

impl TsDemuxer {
    /// Builds a fresh demuxer with no PID bindings learned yet.
    pub fn new(
        observer: Box<dyn DemuxObserver>,
        remuxer: Box<dyn RemuxSink>,
        config: DemuxerConfig,
        type_supported: TypeSupported,
    ) -> Self {
        Self {
            observer,
            remuxer,
            config,
            type_supported,
            video: VideoTrack::default(),
            audio: AudioTrack::default(),
            id3: Id3Track::default(),
            text: TextTrack::default(),
            pmt_pid: None,
            pmt_seen: false,
            video_accum: PesAccumulator::default(),
            audio_accum: PesAccumulator::default(),
            id3_accum: PesAccumulator::default(),
            avc_scanner: AnnexBScanner::new(),
            hevc_scanner: AnnexBScanner::new(),
            avc_sample: None,
            aud_found: false,
            sps_found: false,
            hevc_group: Vec::new(),
            hevc_group_key: false,
            aac_overflow: None,
            aac_last_pts: None,
            last_cc: None,
            saw_unknown_pid: false,
            pmt_rewind_pending: false,
            rewound_this_push: false,
            fatal_this_push: false,
        }
    }

    /// Finds the first offset within `buffer` at which three consecutive
    /// 188-byte packets all start with the sync byte, searched within the
    /// first `min(1000, len - 564)` bytes. Returns `None` for anything too
    /// short or lacking that alignment.
    fn sync_offset(buffer: &[u8]) -> Option<usize> {
        if buffer.len() < PROBE_PACKET_COUNT * TS_PACKET_SIZE {
            return None;
        }
        let limit = std::cmp::min(1000, buffer.len() - PROBE_PACKET_COUNT * TS_PACKET_SIZE);
        (0..=limit).find(|&i| {
            (0..PROBE_PACKET_COUNT).all(|k| buffer.get(i + k * TS_PACKET_SIZE) == Some(&SYNC_BYTE))
        })
    }

    /// True if `buffer` looks like Transport Stream data: at least three
    /// consecutive 188-byte packets starting with the sync byte.
    pub fn probe(buffer: &[u8]) -> bool {
        Self::sync_offset(buffer).is_some()
    }

    fn report_error(&mut self, fatal: bool, reason: String) {
        if fatal {
            self.fatal_this_push = true;
        }
        self.observer.trigger(DemuxEvent {
            kind: ErrorKind::MediaError,
            details: ErrorDetail::FragParsingError,
            fatal,
            reason,
        });
    }

    /// Feeds one buffer of TS packets through the demuxer, extracting every
    /// complete access unit / audio frame / ID3 payload it can, and hands the
    /// result to the configured [`RemuxSink`].
    ///
    /// `cc` is a caller-maintained continuity counter (or sequence number);
    /// `contiguous` passed to the sink is true exactly when it matches the
    /// previous call's. `time_offset` and `accurate_time_offset` are threaded
    /// straight through to the sink with no reinterpretation.
    pub fn push(&mut self, buffer: &[u8], time_offset: f64, cc: Option<u8>, accurate_time_offset: bool) {
        self.video.clear_samples();
        self.audio.clear_samples();
        self.id3.samples.clear();
        self.text.samples.clear();
        self.fatal_this_push = false;
        self.pmt_rewind_pending = false;
        self.rewound_this_push = false;

        let contiguous = self.last_cc.is_some() && self.last_cc == cc;
        self.last_cc = cc;

        let sync = match Self::sync_offset(buffer) {
            Some(s) => s,
            None => {
                self.remuxer.remux(
                    &self.audio,
                    &self.video,
                    &self.id3,
                    &self.text,
                    time_offset,
                    contiguous,
                    accurate_time_offset,
                );
                return;
            }
        };

        let usable = buffer.len() - sync;
        let trimmed_len = sync + usable - (usable % TS_PACKET_SIZE);

        let mut start = sync;
        while start + TS_PACKET_SIZE <= trimmed_len {
            if buffer[start] != SYNC_BYTE {
                self.report_error(false, "sync byte lost mid-stream".to_string());
                start += TS_PACKET_SIZE;
                continue;
            }
            self.process_packet(buffer, start);
            if self.fatal_this_push {
                // A fatal condition (e.g. no ADTS header found anywhere in an
                // AAC PES) abandons the rest of this fragment entirely: no
                // further packets are processed and the remuxer is not
                // invoked (§7). Long-lived track state is left untouched.
                return;
            }
            if self.pmt_rewind_pending && !self.rewound_this_push {
                // The PMT was just learned for the first time and packets on
                // still-unbound PIDs were already seen earlier in this
                // buffer: rewind once to `sync` so they are reprocessed
                // against the newly learned bindings (spec.md:67, P8).
                self.pmt_rewind_pending = false;
                self.rewound_this_push = true;
                start = sync;
                continue;
            }
            start += TS_PACKET_SIZE;
        }

        self.flush_video();
        self.flush_audio();
        self.flush_id3();

        self.remuxer.remux(
            &self.audio,
            &self.video,
            &self.id3,
            &self.text,
            time_offset,
            contiguous,
            accurate_time_offset,
        );
    }

    fn process_packet(&mut self, buffer: &[u8], start: usize) {
        let b1 = buffer[start + 1];
        let b2 = buffer[start + 2];
        let b3 = buffer[start + 3];
        let pusi = (b1 & 0x40) != 0;
        let pid = (((b1 & 0x1F) as u16) << 8) | b2 as u16;
        let afc = (b3 >> 4) & 0x3;

        if afc == 0 || afc == 2 {
            // No payload: adaptation-field-only packet (PCR carrier, stuffing).
            return;
        }

        let mut payload_start = start + 4;
        if afc == 3 {
            if payload_start >= buffer.len() {
                return;
            }
            let af_len = buffer[payload_start] as usize;
            payload_start += 1 + af_len;
        }
        if payload_start >= start + TS_PACKET_SIZE {
            return;
        }
        let payload = &buffer[payload_start..start + TS_PACKET_SIZE];

        if pid == PID_PAT {
            if let Some(pmt_pid) = parse_pat(payload, pusi) {
                self.pmt_pid = Some(pmt_pid);
            }
            return;
        }

        if Some(pid) == self.pmt_pid {
            if let Some(info) = parse_pmt(payload, pusi) {
                self.apply_pmt(info);
            }
            return;
        }

        if Some(pid) == self.video.pid {
            self.handle_video_packet(pusi, payload);
            return;
        }
        if Some(pid) == self.audio.pid {
            self.handle_audio_packet(pusi, payload);
            return;
        }
        if Some(pid) == self.id3.pid {
            self.handle_id3_packet(pusi, payload);
            return;
        }

        if pid == PID_SDT || pid == PID_NULL {
            return;
        }

        self.saw_unknown_pid = true;
    }

    fn apply_pmt(&mut self, info: PmtInfo) {
        let first_pmt = !self.pmt_seen;
        self.pmt_seen = true;

        self.video.pid = info.video_pid;
        self.video.stream_type = info.video_stream_type;
        self.audio.pid = info.audio_pid;
        self.audio.stream_type = info.audio_stream_type;
        self.id3.pid = info.id3_pid;

        if first_pmt && self.saw_unknown_pid {
            debug!("PMT discovered after packets for its elementary streams were already seen; rewinding packet loop to re-bind them");
            self.pmt_rewind_pending = true;
        }
        self.saw_unknown_pid = false;
    }

    // -- PES accumulation --------------------------------------------------

    fn handle_video_packet(&mut self, pusi: bool, payload: &[u8]) {
        if pusi && !self.video_accum.is_empty() {
            self.flush_video();
        }
        self.video_accum.push(payload);
    }

    fn handle_audio_packet(&mut self, pusi: bool, payload: &[u8]) {
        if pusi && !self.audio_accum.is_empty() {
            self.flush_audio();
        }
        self.audio_accum.push(payload);
    }

    fn handle_id3_packet(&mut self, pusi: bool, payload: &[u8]) {
        if pusi && !self.id3_accum.is_empty() {
            self.flush_id3();
        }
        self.id3_accum.push(payload);
    }

    fn flush_video(&mut self) {
        if self.video_accum.is_empty() {
            return;
        }
        let (slices, len) = self.video_accum.take();
        let pes = match parse_pes(&slices, len) {
            Some(pes) => pes,
            None => {
                self.report_error(false, "truncated or malformed video PES header".to_string());
                return;
            }
        };

        match self.video.stream_type {
            Some(STREAM_TYPE_AVC) => {
                let nals = self.avc_scanner.feed(&pes.data, |b| b & 0x1F);
                for nal in nals {
                    self.handle_avc_nal(nal, pes.pts, pes.dts);
                }
            }
            Some(STREAM_TYPE_HEVC) => {
                let nals = self.hevc_scanner.feed(&pes.data, |b| (b >> 1) & 0x3F);
                for nal in nals {
                    self.handle_hevc_nal(nal, pes.pts, pes.dts);
                }
            }
            Some(other) => {
                warn!("unsupported video stream_type {:#x}, dropping PES", other);
            }
            None => {}
        }
    }

    fn flush_audio(&mut self) {
        if self.audio_accum.is_empty() {
            return;
        }
        let (slices, len) = self.audio_accum.take();
        let pes = match parse_pes(&slices, len) {
            Some(pes) => pes,
            None => {
                self.report_error(false, "truncated or malformed audio PES header".to_string());
                return;
            }
        };

        match self.audio.stream_type {
            Some(crate::format::ts::types::STREAM_TYPE_AAC) => {
                self.handle_aac_payload(pes.data, pes.pts);
            }
            Some(st) if crate::format::ts::types::is_mpeg_audio_stream_type(st) => {
                self.handle_mpeg_audio_payload(&pes.data, pes.pts);
            }
            Some(other) => {
                warn!("unsupported audio stream_type {:#x}, dropping PES", other);
            }
            None => {}
        }
    }

    fn flush_id3(&mut self) {
        if self.id3_accum.is_empty() {
            return;
        }
        let (slices, len) = self.id3_accum.take();
        if let Some(pes) = parse_pes(&slices, len) {
            self.id3.push_sample(Id3Sample {
                pts: pes.pts,
                dts: pes.dts,
                data: pes.data,
            });
        } else {
            self.report_error(false, "truncated or malformed ID3 PES header".to_string());
        }
    }

    // -- AVC -----------------------------------------------------------

    fn ensure_avc_sample(&mut self, pts: i64, dts: i64) {
        if self.avc_sample.is_none() {
            self.avc_sample = Some(VideoSample::new(pts, dts));
        }
    }

    fn avc_slice(&mut self, nal: NalUnit, pts: i64, dts: i64, is_idr: bool) {
        if let Some(sample) = &self.avc_sample {
            if sample.frame && !self.aud_found {
                if let Some(finished) = self.avc_sample.take() {
                    self.video.push_sample(finished);
                }
            }
        }
        let created_new = self.avc_sample.is_none();
        if created_new {
            self.avc_sample = Some(VideoSample::new(pts, dts));
        }
        let sample = self.avc_sample.as_mut().expect("just ensured");
        if is_idr || created_new {
            sample.key = true;
        }
        sample.frame = true;

        if !is_idr && self.sps_found && nal.data.len() > 4 {
            let payload = remove_emulation_prevention(&nal.data[1..]);
            if let Ok(slice_type) = h264::parse_slice_type(&payload) {
                if h264::is_keyframe_slice_type(slice_type) {
                    sample.key = true;
                }
            }
        }
        sample.push_unit(nal);
    }

    fn handle_avc_nal(&mut self, nal: NalUnit, pts: i64, dts: i64) {
        use h264::types::{NAL_AUD, NAL_IDR, NAL_PPS, NAL_SEI, NAL_SLICE, NAL_SPS};

        match nal.nal_type {
            NAL_SLICE => self.avc_slice(nal, pts, dts, false),
            NAL_IDR => self.avc_slice(nal, pts, dts, true),
            NAL_SEI => {
                self.ensure_avc_sample(pts, dts);
                let rbsp = remove_emulation_prevention(&nal.data[1..]);
                self.extract_cea608(&rbsp, pts);
                self.avc_sample.as_mut().expect("just ensured").push_unit(nal);
            }
            NAL_SPS => {
                self.sps_found = true;
                if self.video.sps.is_none() {
                    let epb_free = remove_emulation_prevention(&nal.data);
                    match h264::parse_sps(&epb_free) {
                        Ok(info) => {
                            self.video.width = Some(info.width);
                            self.video.height = Some(info.height);
                            self.video.pixel_ratio = info.pixel_ratio;
                            self.video.codec = Some(info.codec);
                            self.video.sps = Some(nal.data.clone());
                        }
                        Err(e) => self.report_error(false, format!("AVC SPS parse failed: {e}")),
                    }
                }
                self.ensure_avc_sample(pts, dts);
                self.avc_sample.as_mut().expect("just ensured").push_unit(nal);
            }
            NAL_PPS => {
                if self.video.pps.is_none() {
                    self.video.pps = Some(nal.data.clone());
                }
                self.ensure_avc_sample(pts, dts);
                self.avc_sample.as_mut().expect("just ensured").push_unit(nal);
            }
            NAL_AUD => {
                self.aud_found = true;
                if let Some(sample) = self.avc_sample.take() {
                    self.video.push_sample(sample);
                }
                self.avc_sample = Some(VideoSample::new(pts, dts));
            }
            _ => {}
        }
    }

    // -- HEVC ------------------------------------------------------------

    fn close_hevc_au(&mut self, pts: i64, dts: i64) {
        if self.hevc_group.is_empty() {
            self.hevc_group_key = false;
            return;
        }
        let key = self.hevc_group_key;
        self.hevc_group_key = false;
        let mut sample = VideoSample::new(pts, dts);
        sample.key = key;
        sample.frame = true;
        for nal in self.hevc_group.drain(..) {
            sample.push_unit(nal);
        }

        let accept =
            !self.config.force_key_frame_on_discontinuity || key || self.video.sps.is_some();
        if accept {
            self.video.push_sample(sample);
        } else {
            self.video.dropped += 1;
        }
    }

    fn handle_hevc_nal(&mut self, nal: NalUnit, pts: i64, dts: i64) {
        use h265::types::{
            is_keyframe_nal_type, is_vcl, NAL_AUD, NAL_PPS, NAL_PREFIX_SEI, NAL_SPS,
            NAL_SUFFIX_SEI, NAL_VPS,
        };

        match nal.nal_type {
            NAL_VPS => {
                if self.video.vps.is_none() {
                    self.video.vps = Some(nal.data.clone());
                }
            }
            NAL_SPS => {
                if self.video.sps.is_none() {
                    let epb_free = remove_emulation_prevention(&nal.data);
                    match h265::parse_sps(&epb_free) {
                        Ok(info) => {
                            self.video.width = Some(info.width);
                            self.video.height = Some(info.height);
                            self.video.chroma_format_idc = Some(info.chroma_format_idc as u8);
                            self.video.bit_depth_luma_minus8 =
                                Some(info.bit_depth_luma_minus8 as u8);
                            self.video.bit_depth_chroma_minus8 =
                                Some(info.bit_depth_chroma_minus8 as u8);
                            self.video.codec = Some(info.codec);
                            self.video.sps = Some(nal.data.clone());
                        }
                        Err(e) => self.report_error(false, format!("HEVC SPS parse failed: {e}")),
                    }
                }
            }
            NAL_PPS => {
                if self.video.pps.is_none() {
                    self.video.pps = Some(nal.data.clone());
                }
            }
            NAL_AUD => self.close_hevc_au(pts, dts),
            NAL_PREFIX_SEI | NAL_SUFFIX_SEI => {
                let rbsp = remove_emulation_prevention(&nal.data[2..]);
                self.extract_cea608(&rbsp, pts);
            }
            t if is_vcl(t) => {
                if is_keyframe_nal_type(t) {
                    self.hevc_group_key = true;
                }
                self.hevc_group.push(nal);
            }
            _ => {}
        }
    }

    // -- CEA-608 -----------------------------------------------------------

    /// Walks an EPB-stripped SEI payload's `payload_type`/`payload_size`
    /// pairs, extracting `cc_data()` bytes from any
    /// `user_data_registered_itu_t_t35` (`payload_type == 4`) message whose
    /// ITU-T T.35 header identifies it as a CEA-708 `GA94` caption carrier.
    /// Stops as soon as fewer than 2 bytes remain, matching how real streams
    /// pad trailing SEI messages.
    fn extract_cea608(&mut self, payload: &[u8], pts: i64) {
        let mut offset = 0usize;
        while payload.len().saturating_sub(offset) >= 2 {
            let mut payload_type: u32 = 0;
            while offset < payload.len() && payload[offset] == 0xFF {
                payload_type += 255;
                offset += 1;
            }
            if offset >= payload.len() {
                break;
            }
            payload_type += payload[offset] as u32;
            offset += 1;

            if offset >= payload.len() {
                break;
            }
            let mut payload_size: u32 = 0;
            while offset < payload.len() && payload[offset] == 0xFF {
                payload_size += 255;
                offset += 1;
            }
            if offset >= payload.len() {
                break;
            }
            payload_size += payload[offset] as u32;
            offset += 1;

            let size = payload_size as usize;
            if offset + size > payload.len() {
                break;
            }
            let body = &payload[offset..offset + size];

            if payload_type == 4 {
                self.extract_t35_cea608(body, pts);
            }

            offset += size;
        }
    }

    fn extract_t35_cea608(&mut self, body: &[u8], pts: i64) {
        const COUNTRY_US: u8 = 181;
        const PROVIDER_ATSC: u16 = 49;
        const USER_STRUCTURE_GA94: u32 = 0x4741_3934; // "GA94"
        const USER_DATA_TYPE_CC: u8 = 3;

        if body.len() < 9 {
            return;
        }
        let country = body[0];
        let provider = ((body[1] as u16) << 8) | body[2] as u16;
        let user_structure = u32::from_be_bytes([body[3], body[4], body[5], body[6]]);
        let user_data_type = body[7];
        if country != COUNTRY_US
            || provider != PROVIDER_ATSC
            || user_structure != USER_STRUCTURE_GA94
            || user_data_type != USER_DATA_TYPE_CC
        {
            return;
        }

        let first_byte = body[8];
        let total_ccs = (first_byte & 0x1F) as usize;
        let cc_len = total_ccs * 3 + 2;
        if body.len() < 8 + cc_len {
            return;
        }
        let data = Bytes::copy_from_slice(&body[8..8 + cc_len]);
        self.text.insert_sorted(CaptionSample {
            pts,
            kind: USER_DATA_TYPE_CC,
            data,
        });
    }

    // -- AAC -----------------------------------------------------------

    fn handle_aac_payload(&mut self, payload: Bytes, mut pts: i64) {
        let overflow_present = self.aac_overflow.is_some();
        let mut buf = self.aac_overflow.take().unwrap_or_default();
        buf.extend_from_slice(&payload);

        let offset0 = match aac::find_syncword(&buf) {
            Some(o) => o,
            None => {
                self.report_error(true, "no ADTS header found in AAC PES".to_string());
                self.aac_overflow = None;
                return;
            }
        };
        if offset0 != 0 {
            self.report_error(
                false,
                format!("AAC PES did not start with an ADTS header, offset {offset0}"),
            );
        }

        if self.audio.samplerate.is_none() {
            if let Ok(header) = aac::parse_header(&buf[offset0..]) {
                self.audio.samplerate = header.sample_rate();
                self.audio.channel_count = Some(header.channel_configuration);
                self.audio.object_type = Some(header.object_type());
                self.audio.codec = Some(header.codec_string());
            }
        }

        let samplerate = match self.audio.samplerate {
            Some(s) if s > 0 => s,
            _ => {
                self.aac_overflow = Some(buf[offset0..].to_vec());
                return;
            }
        };
        let frame_duration = (1024i64 * crate::track::TIME_SCALE as i64) / samplerate as i64;

        if overflow_present {
            if let Some(last_pts) = self.aac_last_pts {
                let expected = last_pts + frame_duration;
                if (expected - pts).abs() > 1 {
                    pts = expected;
                }
            }
        }

        let mut offset = offset0;
        let mut frame_index: i64 = 0;
        while offset + 5 < buf.len() {
            let header = match aac::parse_header(&buf[offset..]) {
                Ok(h) => h,
                Err(_) => break,
            };
            let frame_len = header.frame_length as usize;
            let header_len = header.header_len();
            if frame_len < header_len || offset + frame_len > buf.len() {
                break;
            }
            let data = Bytes::copy_from_slice(&buf[offset + header_len..offset + frame_len]);
            let sample_pts = pts + frame_index * frame_duration;
            self.audio.push_sample(AudioSample {
                pts: sample_pts,
                dts: sample_pts,
                data,
            });
            self.aac_last_pts = Some(sample_pts);
            frame_index += 1;
            offset += frame_len;
        }

        self.aac_overflow = if offset < buf.len() {
            Some(buf[offset..].to_vec())
        } else {
            None
        };
    }

    // -- MPEG Layer I/II/III audio ------------------------------------------

    fn handle_mpeg_audio_payload(&mut self, payload: &[u8], pts: i64) {
        let mut offset = 0usize;
        let mut frame_index: i64 = 0;

        while offset + 4 <= payload.len() {
            let start = match mpegaudio::find_syncword(&payload[offset..]) {
                Some(rel) => offset + rel,
                None => break,
            };
            let header = match mpegaudio::parse_header(&payload[start..]) {
                Ok(h) => h,
                Err(_) => break,
            };
            let frame_len = header.frame_length as usize;
            if frame_len < 4 || start + frame_len > payload.len() {
                break;
            }

            if self.audio.samplerate.is_none() {
                self.audio.samplerate = Some(header.sample_rate);
                self.audio.channel_count = Some(header.channels);
                self.audio.codec = Some(header.codec_string());
            }

            let samples_per_frame: i64 = match header.layer {
                MpegLayer::Layer1 => 384,
                MpegLayer::Layer2 | MpegLayer::Layer3 => 1152,
            };
            let frame_duration =
                samples_per_frame * crate::track::TIME_SCALE as i64 / header.sample_rate as i64;
            let sample_pts = pts + frame_index * frame_duration;

            let data = Bytes::copy_from_slice(&payload[start..start + frame_len]);
            self.audio.push_sample(AudioSample {
                pts: sample_pts,
                dts: sample_pts,
                data,
            });

            frame_index += 1;
            offset = start + frame_len;
        }
    }

    // -- Lifecycle -----------------------------------------------------------

    /// Clears every track's PID binding, parameter sets and in-progress
    /// parsing state, starting a fresh init segment. Used when an embedder
    /// switches source streams (e.g. a new HLS variant) without tearing down
    /// the whole demuxer.
    pub fn reset_init_segment(&mut self) {
        self.video.reset();
        self.audio.reset();
        self.id3.reset();
        self.text.reset();

        self.pmt_pid = None;
        self.pmt_seen = false;
        self.saw_unknown_pid = false;
        self.pmt_rewind_pending = false;
        self.rewound_this_push = false;

        self.video_accum = PesAccumulator::default();
        self.audio_accum = PesAccumulator::default();
        self.id3_accum = PesAccumulator::default();

        self.avc_scanner.clear();
        self.hevc_scanner.clear();
        self.avc_sample = None;
        self.aud_found = false;
        self.sps_found = false;
        self.hevc_group.clear();
        self.hevc_group_key = false;

        self.aac_overflow = None;
        self.aac_last_pts = None;
    }

    /// Forgets the cumulative AAC PTS-gluing state, so the next audio frame's
    /// timestamp is taken from its PES header rather than extrapolated.
    /// Called by an embedder after an explicit seek or discontinuity where
    /// the previous frame's timeline is no longer meaningful.
    pub fn reset_timestamp(&mut self) {
        self.aac_last_pts = None;
    }

    /// No-op hook for embedders that decrypt SAMPLE-AES-protected payloads
    /// upstream of this demuxer; out of scope for this crate (see the
    /// Non-goals on encrypted streams).
    pub fn set_decrypt_data(&mut self, _data: &[u8]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remux::tests::{RecordingObserver, RecordingSink};
    use crate::utils::Crc32Mpeg2;

    fn pat_packet(pmt_pid: u16) -> Vec<u8> {
        let mut section = vec![
            0x00, 0xB0, 0x0D, 0x00, 0x01, 0xC1, 0x00, 0x00, 0x00, 0x01,
            (0xE0 | (pmt_pid >> 8)) as u8,
            (pmt_pid & 0xFF) as u8,
        ];
        let crc = Crc32Mpeg2::new().calculate(&section);
        section.extend_from_slice(&crc.to_be_bytes());

        let mut packet = vec![0x47, 0x40, 0x00, 0x10, 0x00];
        packet.extend_from_slice(&section);
        packet.resize(TS_PACKET_SIZE, 0xFF);
        packet
    }

    fn pmt_packet(pmt_pid: u16, video_pid: u16, audio_pid: u16) -> Vec<u8> {
        let mut body = vec![
            0x02, 0, 0, 0x00, 0x01, 0xC1, 0x00, 0x00,
            (0xE0 | (video_pid >> 8)) as u8,
            (video_pid & 0xFF) as u8,
            0xF0, 0x00,
        ];
        body.push(STREAM_TYPE_AVC);
        body.push((0xE0 | (video_pid >> 8)) as u8);
        body.push((video_pid & 0xFF) as u8);
        body.push(0xF0);
        body.push(0x00);
        body.push(crate::format::ts::types::STREAM_TYPE_AAC);
        body.push((0xE0 | (audio_pid >> 8)) as u8);
        body.push((audio_pid & 0xFF) as u8);
        body.push(0xF0);
        body.push(0x00);

        let section_length = body.len() - 3 + 4;
        body[1] = 0xB0 | ((section_length >> 8) as u8 & 0x0F);
        body[2] = (section_length & 0xFF) as u8;
        let crc = Crc32Mpeg2::new().calculate(&body);
        body.extend_from_slice(&crc.to_be_bytes());

        let mut packet = vec![
            0x47,
            0x40 | ((pmt_pid >> 8) as u8 & 0x1F),
            (pmt_pid & 0xFF) as u8,
            0x10,
            0x00,
        ];
        packet.extend_from_slice(&body);
        packet.resize(TS_PACKET_SIZE, 0xFF);
        packet
    }

    fn demuxer() -> TsDemuxer {
        TsDemuxer::new(
            Box::new(RecordingObserver::default()),
            Box::new(RecordingSink::default()),
            DemuxerConfig {
                force_key_frame_on_discontinuity: false,
            },
            TypeSupported::default(),
        )
    }

    #[test]
    fn probe_requires_three_aligned_sync_bytes() {
        assert!(!TsDemuxer::probe(&[]));
        let mut buf = vec![0u8; TS_PACKET_SIZE * 3];
        buf[0] = SYNC_BYTE;
        buf[TS_PACKET_SIZE] = SYNC_BYTE;
        buf[TS_PACKET_SIZE * 2] = SYNC_BYTE;
        assert!(TsDemuxer::probe(&buf));
    }

    #[test]
    fn probe_rejects_short_buffer() {
        assert!(!TsDemuxer::probe(&[0x47, 0x40, 0x00, 0x10]));
    }

    #[test]
    fn learns_pmt_pid_bindings_from_pat_and_pmt() {
        let mut demux = demuxer();
        let mut buf = pat_packet(0x100);
        buf.extend_from_slice(&pmt_packet(0x100, 0x101, 0x102));
        let mut null_packet = vec![0x47, 0x1F, 0xFF, 0x10];
        null_packet.resize(TS_PACKET_SIZE, 0xFF);
        buf.extend_from_slice(&null_packet);

        demux.push(&buf, 0.0, Some(0), false);
        assert_eq!(demux.video.pid, Some(0x101));
        assert_eq!(demux.audio.pid, Some(0x102));
    }

    #[test]
    fn push_on_garbage_buffer_with_sync_bytes_emits_no_samples() {
        let mut demux = demuxer();
        let mut buf = vec![0u8; TS_PACKET_SIZE * 3];
        buf[0] = SYNC_BYTE;
        buf[TS_PACKET_SIZE] = SYNC_BYTE;
        buf[TS_PACKET_SIZE * 2] = SYNC_BYTE;
        demux.push(&buf, 0.0, None, false);
        assert!(demux.video.samples.is_empty());
        assert!(demux.audio.samples.is_empty());
    }

    #[test]
    fn reset_init_segment_clears_pid_bindings() {
        let mut demux = demuxer();
        let mut buf = pat_packet(0x100);
        buf.extend_from_slice(&pmt_packet(0x100, 0x101, 0x102));
        let mut null_packet = vec![0x47, 0x1F, 0xFF, 0x10];
        null_packet.resize(TS_PACKET_SIZE, 0xFF);
        buf.extend_from_slice(&null_packet);
        demux.push(&buf, 0.0, Some(0), false);
        assert!(demux.video.pid.is_some());

        demux.reset_init_segment();
        assert!(demux.video.pid.is_none());
        assert!(demux.pmt_pid.is_none());
    }

    fn pes_packet(pid: u16, pusi: bool, payload: &[u8]) -> Vec<u8> {
        let mut packet = vec![
            0x47,
            (if pusi { 0x40 } else { 0x00 }) | ((pid >> 8) as u8 & 0x1F),
            (pid & 0xFF) as u8,
            0x10,
        ];
        packet.extend_from_slice(payload);
        packet.resize(TS_PACKET_SIZE, 0xFF);
        packet
    }

    fn audio_pes_header(body_len: usize) -> Vec<u8> {
        let mut out = vec![0x00, 0x00, 0x01, 0xC0];
        out.push((body_len as u16 >> 8) as u8);
        out.push((body_len & 0xFF) as u8);
        out.push(0x80); // flags: PTS present
        out.push(0x00);
        out.push(5); // header_data_length
        out.extend_from_slice(&[0x21, 0x00, 0x01, 0x00, 0x01]); // PTS = 0
        out
    }

    #[test]
    fn fatal_aac_error_aborts_push_without_invoking_remuxer() {
        let mut demux = demuxer();
        let mut buf = pat_packet(0x100);
        buf.extend_from_slice(&pmt_packet(0x100, 0x101, 0x102));

        // First audio PES carries no ADTS syncword anywhere in its payload.
        let garbage = vec![0x00u8; 16];
        let mut pes = audio_pes_header(8 + garbage.len());
        pes.extend_from_slice(&garbage);
        buf.extend_from_slice(&pes_packet(0x102, true, &pes));

        // A second PUSI packet on the same PID forces the first PES to flush
        // (and its fatal "no ADTS header found" error to fire) before the
        // input buffer is exhausted.
        buf.extend_from_slice(&pes_packet(0x102, true, &[0x00, 0x00, 0x01, 0xC0, 0x00, 0x00]));

        demux.push(&buf, 0.0, Some(0), false);

        assert!(demux.fatal_this_push);
    }

    #[test]
    fn pmt_rewind_binds_packets_seen_before_pmt_in_same_buffer() {
        let mut demux = demuxer();

        // A complete ADTS frame (7-byte header, protection_absent, 2 bytes of
        // frame payload, frame_length = 9), reused verbatim as a fixture.
        const ADTS_FRAME: [u8; 9] = [0xFF, 0xF1, 0x50, 0x80, 0x00, 0x1F, 0xFC, 0xAA, 0xBB];
        let mut pes = audio_pes_header(8 + ADTS_FRAME.len());
        pes.extend_from_slice(&ADTS_FRAME);

        // The audio PES arrives on PID 0x102 before the PAT/PMT that binds
        // it: without the P8 rewind this packet is gone for good once the
        // PMT is parsed, since `audio.samples` is only ever populated by
        // replaying packets against a PID binding that didn't exist yet.
        let mut buf = pes_packet(0x102, true, &pes);
        buf.extend_from_slice(&pat_packet(0x100));
        buf.extend_from_slice(&pmt_packet(0x100, 0x101, 0x102));

        demux.push(&buf, 0.0, Some(0), false);

        assert_eq!(demux.audio.pid, Some(0x102));
        assert_eq!(demux.audio.samples.len(), 1);
    }

    #[test]
    fn extract_cea608_ignores_non_t35_payload_types() {
        let mut demux = demuxer();
        // payload_type=0 (unrelated), payload_size=2, two bytes of body.
        demux.extract_cea608(&[0x00, 0x02, 0xAA, 0xBB], 1000);
        assert!(demux.text.samples.is_empty());
    }

    #[test]
    fn extract_cea608_parses_well_formed_t35_message() {
        let mut demux = demuxer();
        let mut body = vec![181, 0, 49, b'G', b'A', b'9', b'4', 3];
        let first_byte = 0x01u8; // total_ccs = 1
        body.push(first_byte);
        body.extend_from_slice(&[0xFC, 0x80, 0x80, 0x00]); // (1*3+2) = 5 bytes incl. first_byte

        let mut payload = vec![4u8, body.len() as u8];
        payload.extend_from_slice(&body);
        demux.extract_cea608(&payload, 5000);

        assert_eq!(demux.text.samples.len(), 1);
        assert_eq!(demux.text.samples[0].pts, 5000);
        assert_eq!(demux.text.samples[0].data.len(), 5);
    }
}
