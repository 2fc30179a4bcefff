//! Session lifecycle events delivered to the playback pipeline

use serde::{Deserialize, Serialize};

/// Why a session was considered finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum EndReason {
    /// A frame from a different session arrived
    Boundary,
    /// An explicit session_end command
    Command,
    /// No traffic for the inactivity window
    Timeout,
}

/// Lifecycle event emitted by the session tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SessionEvent {
    Started { session_id: u8 },
    Ended { session_id: u8, reason: EndReason },
    Interrupted { session_id: u8 },
}

impl SessionEvent {
    pub fn session_id(&self) -> u8 {
        match *self {
            SessionEvent::Started { session_id }
            | SessionEvent::Ended { session_id, .. }
            | SessionEvent::Interrupted { session_id } => session_id,
        }
    }
}
