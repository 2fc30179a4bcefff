//! Session state held by the tracker

use serde::{Deserialize, Serialize};

/// Coarse view of the tracker state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum TrackerPhase {
    Idle,
    Active(u8),
}

/// Current session plus the "last seen" memory used to collapse duplicates.
///
/// Each memory slot holds a single session id. Session ids are 8 bits wide, so after
/// 256 sessions an id is reused and a very late packet from the earlier use of that
/// id is indistinguishable from one belonging to the current use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SessionState {
    /// Active session, `None` while idle
    pub current_session_id: Option<u8>,
    /// Last session whose end (or interrupt) was already delivered
    pub last_ended_session_id: Option<u8>,
    /// Last session whose session_end command was processed
    pub last_end_command_session_id: Option<u8>,
    /// Last session whose session_interrupt command was processed
    pub last_interrupt_command_session_id: Option<u8>,
}

impl SessionState {
    pub fn phase(&self) -> TrackerPhase {
        match self.current_session_id {
            Some(id) => TrackerPhase::Active(id),
            None => TrackerPhase::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current_session_id.is_none()
    }

    /// Whether an end event for `session_id` has already gone out.
    pub fn has_ended(&self, session_id: u8) -> bool {
        self.last_ended_session_id == Some(session_id)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
