//! # MPEG-2 Transport Stream wire format
//!
//! Parsing only: PSI tables ([`parser`]), PES headers ([`pes`]) and the
//! constants/records both share ([`types`]). The stateful driver that ties
//! these together into demuxed tracks lives one level up, at
//! [`crate::demux::TsDemuxer`].

/// PAT/PMT (Program Specific Information) table parsing.
pub mod parser;
/// PES (Packetized Elementary Stream) header parsing.
pub mod pes;
/// TS packet constants and the parsed PMT record.
pub mod types;

pub use parser::{parse_pat, parse_pmt};
pub use pes::{parse_pes, PesInfo};
pub use types::{PmtInfo, SYNC_BYTE, TS_PACKET_SIZE};
