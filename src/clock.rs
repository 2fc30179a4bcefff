//! Sender-side frame counters

use tracing::{debug, trace};

use crate::codec;
use crate::types::fields::{PROTOCOL_VERSION, SEQUENCE_MODULUS};
use crate::types::{CommandType, FrameKind};

/// Counters the sender advances while stamping outgoing frames.
///
/// `sentence_id` restarts at 0 whenever the session id changes and advances once per
/// data frame. `base_pts` advances by each frame's duration, data or command.
/// All counters wrap silently at their field width.
#[derive(Debug, Clone)]
pub struct FrameClock {
    version: u8,
    session_id: u8,
    sentence_id: u16,
    base_pts: u16,
    /// Data frames sent in the current session, reported as `session_dur_packs`
    session_packs: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_version(PROTOCOL_VERSION)
    }

    pub fn with_version(version: u8) -> Self {
        Self { version, session_id: 0, sentence_id: 0, base_pts: 0, session_packs: 0 }
    }

    /// Switch to a session. Counters tied to the session reset only if the id changes.
    pub fn set_session(&mut self, session_id: u8) {
        if session_id != self.session_id {
            debug!(from = self.session_id, to = session_id, "Switching sender session");
            self.session_id = session_id;
            self.sentence_id = 0;
            self.session_packs = 0;
        }
    }

    /// Advance to the next session id (mod 256) and return it.
    pub fn next_session(&mut self) -> u8 {
        let next = self.session_id.wrapping_add(1);
        self.set_session(next);
        next
    }

    /// Stamp one data frame of `duration_ms` audio.
    pub fn encode_data_frame(&mut self, duration_ms: u16) -> u64 {
        let value = codec::encode_versioned(
            self.version,
            self.session_id as u32,
            FrameKind::Data,
            self.sentence_id as u32,
            0,
            self.base_pts as u32,
        );
        trace!(
            session_id = self.session_id,
            sentence_id = self.sentence_id,
            base_pts = self.base_pts,
            "Encoded data frame"
        );

        self.sentence_id = (self.sentence_id + 1) % SEQUENCE_MODULUS as u16;
        self.session_packs = self.session_packs.wrapping_add(1);
        self.base_pts = self.base_pts.wrapping_add(duration_ms);
        value
    }

    /// Stamp one command frame. `session_dur_packs` is truncated to 12 bits.
    pub fn encode_command(
        &mut self,
        cmd_type: CommandType,
        session_dur_packs: u16,
        duration_ms: u16,
    ) -> u64 {
        let value = codec::encode_versioned(
            self.version,
            self.session_id as u32,
            FrameKind::Command,
            cmd_type.raw() as u32,
            session_dur_packs as u32,
            self.base_pts as u32,
        );
        trace!(
            session_id = self.session_id,
            ?cmd_type,
            session_dur_packs,
            base_pts = self.base_pts,
            "Encoded command frame"
        );

        self.base_pts = self.base_pts.wrapping_add(duration_ms);
        value
    }

    pub fn session_id(&self) -> u8 {
        self.session_id
    }

    /// Sentence id the next data frame will carry.
    pub fn sentence_id(&self) -> u16 {
        self.sentence_id
    }

    /// Base pts the next frame will carry.
    pub fn base_pts(&self) -> u16 {
        self.base_pts
    }

    /// Data frames stamped in the current session, wrapped to the 12-bit wire width.
    pub fn session_packs(&self) -> u16 {
        (self.session_packs % SEQUENCE_MODULUS) as u16
    }
}
