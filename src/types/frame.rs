//! Decoded frame metadata

use serde::{Deserialize, Serialize};

use super::fields::command;

/// Whether a frame carries audio or only signaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum FrameKind {
    Data,
    Command,
}

/// Command code carried in bits 48-44 of a command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum CommandType {
    SessionEnd,
    SessionInterrupt,
    /// Codes with no assigned meaning; decoded but ignored by the tracker
    Reserved(u8),
}

impl CommandType {
    /// Interpret a 5-bit command code.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            command::SESSION_END => CommandType::SessionEnd,
            command::SESSION_INTERRUPT => CommandType::SessionInterrupt,
            other => CommandType::Reserved(other),
        }
    }

    /// Wire code for this command.
    pub fn raw(self) -> u8 {
        match self {
            CommandType::SessionEnd => command::SESSION_END,
            CommandType::SessionInterrupt => command::SESSION_INTERRUPT,
            CommandType::Reserved(other) => other,
        }
    }
}

/// Metadata unpacked from a non-sentinel timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum DecodedFrame {
    Data { session_id: u8, sentence_id: u16, base_pts: u16 },
    Command { session_id: u8, cmd_type: CommandType, session_dur_packs: u16, base_pts: u16 },
}

impl DecodedFrame {
    pub fn session_id(&self) -> u8 {
        match *self {
            DecodedFrame::Data { session_id, .. } | DecodedFrame::Command { session_id, .. } => {
                session_id
            }
        }
    }

    pub fn base_pts(&self) -> u16 {
        match *self {
            DecodedFrame::Data { base_pts, .. } | DecodedFrame::Command { base_pts, .. } => {
                base_pts
            }
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            DecodedFrame::Data { .. } => FrameKind::Data,
            DecodedFrame::Command { .. } => FrameKind::Command,
        }
    }
}
