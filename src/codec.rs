//! Timestamp codec: packs session bookkeeping into the 64-bit frame stamp.
//!
//! Layout, most-significant bit first:
//!
//! ```text
//! 63      reserved (0)
//! 62      origin marker (1)
//! 61-58   version
//! 57-50   session_id
//! 49      frame_kind (0 = data, 1 = command)
//! data:    48-37 sentence_id, 36-16 reserved
//! command: 48-44 cmd_type, 43-32 session_dur_packs, 31-16 reserved
//! 15-0    base_pts
//! ```
//!
//! Encoding masks every input to its field width, so it never fails. Decoding only
//! rejects the all-zero sentinel; everything else unpacks by the frame kind bit.

use crate::types::fields::{PROTOCOL_VERSION, command, data, header};
use crate::types::{CommandType, DecodedFrame, FrameKind, FrameTimestamp};

#[inline]
fn put(value: u64, shift: u32, mask: u64) -> u64 {
    (value & mask) << shift
}

/// Pack fields into a stamp for an explicit protocol version.
///
/// For data frames `sentence_id_or_cmd_type` is the sentence id and
/// `session_dur_or_unused` is ignored. For command frames they are the command code
/// and the session length in packets.
pub fn encode_versioned(
    version: u8,
    session_id: u32,
    kind: FrameKind,
    sentence_id_or_cmd_type: u32,
    session_dur_or_unused: u32,
    base_pts: u32,
) -> u64 {
    let mut value = 1u64 << header::ORIGIN_BIT;
    value |= put(version as u64, header::VERSION_SHIFT, header::VERSION_MASK);
    value |= put(session_id as u64, header::SESSION_ID_SHIFT, header::SESSION_ID_MASK);

    match kind {
        FrameKind::Data => {
            value |= put(
                sentence_id_or_cmd_type as u64,
                data::SENTENCE_ID_SHIFT,
                data::SENTENCE_ID_MASK,
            );
        }
        FrameKind::Command => {
            value |= 1u64 << header::FRAME_KIND_BIT;
            value |= put(
                sentence_id_or_cmd_type as u64,
                command::CMD_TYPE_SHIFT,
                command::CMD_TYPE_MASK,
            );
            value |= put(
                session_dur_or_unused as u64,
                command::SESSION_DUR_SHIFT,
                command::SESSION_DUR_MASK,
            );
        }
    }

    value | put(base_pts as u64, header::BASE_PTS_SHIFT, header::BASE_PTS_MASK)
}

/// Pack fields into a stamp for the current protocol version.
pub fn encode(
    session_id: u32,
    kind: FrameKind,
    sentence_id_or_cmd_type: u32,
    session_dur_or_unused: u32,
    base_pts: u32,
) -> u64 {
    encode_versioned(
        PROTOCOL_VERSION,
        session_id,
        kind,
        sentence_id_or_cmd_type,
        session_dur_or_unused,
        base_pts,
    )
}

/// Encode a data frame stamp.
pub fn encode_data(session_id: u8, sentence_id: u16, base_pts: u16) -> u64 {
    encode(session_id as u32, FrameKind::Data, sentence_id as u32, 0, base_pts as u32)
}

/// Encode a command frame stamp.
pub fn encode_command(
    session_id: u8,
    cmd_type: CommandType,
    session_dur_packs: u16,
    base_pts: u16,
) -> u64 {
    encode(
        session_id as u32,
        FrameKind::Command,
        cmd_type.raw() as u32,
        session_dur_packs as u32,
        base_pts as u32,
    )
}

/// Unpack a stamp. Returns `None` for the "no metadata" sentinel.
///
/// Origin marker and version are not checked here; see
/// [`FrameTimestamp::is_protocol_stamp`].
pub fn decode(value: u64) -> Option<DecodedFrame> {
    let stamp = FrameTimestamp::new(value);
    if stamp.is_sentinel() {
        return None;
    }

    let session_id = stamp.field(header::SESSION_ID_SHIFT, header::SESSION_ID_MASK) as u8;
    let base_pts = stamp.field(header::BASE_PTS_SHIFT, header::BASE_PTS_MASK) as u16;

    let frame = if stamp.is_set(header::FRAME_KIND_BIT) {
        DecodedFrame::Command {
            session_id,
            cmd_type: CommandType::from_raw(
                stamp.field(command::CMD_TYPE_SHIFT, command::CMD_TYPE_MASK) as u8,
            ),
            session_dur_packs: stamp.field(command::SESSION_DUR_SHIFT, command::SESSION_DUR_MASK)
                as u16,
            base_pts,
        }
    } else {
        DecodedFrame::Data {
            session_id,
            sentence_id: stamp.field(data::SENTENCE_ID_SHIFT, data::SENTENCE_ID_MASK) as u16,
            base_pts,
        }
    };

    Some(frame)
}
