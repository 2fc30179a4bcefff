//! Sender-facing API
//!
//! [`StampSender`] is what the outbound audio pipeline talks to: it hands out a stamp
//! for every frame it is about to send and builds command bursts at session
//! boundaries. One mutex guards the whole frame clock, so stamps handed to
//! concurrent callers never share a sentence id.

use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::Result;
use crate::clock::FrameClock;
use crate::config::SessionConfig;
use crate::emitter::{CommandEmitter, FrameSink};
use crate::types::CommandType;

/// Stamps outgoing frames and emits session commands
#[derive(Debug)]
pub struct StampSender {
    clock: Mutex<FrameClock>,
    emitter: CommandEmitter,
}

impl Default for StampSender {
    fn default() -> Self {
        Self::with_clock(FrameClock::new(), CommandEmitter::default())
    }
}

impl StampSender {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_clock(
            FrameClock::with_version(config.version),
            CommandEmitter::from_config(config),
        ))
    }

    pub fn with_clock(clock: FrameClock, emitter: CommandEmitter) -> Self {
        Self { clock: Mutex::new(clock), emitter }
    }

    fn clock(&self) -> MutexGuard<'_, FrameClock> {
        self.clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Switch to `session_id`; the sentence counter restarts if the id changed.
    pub fn set_session(&self, session_id: u8) {
        self.clock().set_session(session_id);
    }

    /// Begin the next session (id + 1, wrapping) and return its id.
    pub fn next_session(&self) -> u8 {
        let session_id = self.clock().next_session();
        info!(session_id, "Starting outbound session");
        session_id
    }

    pub fn session_id(&self) -> u8 {
        self.clock().session_id()
    }

    /// Data frames stamped so far in the current session (12-bit wrapped).
    pub fn session_packs(&self) -> u16 {
        self.clock().session_packs()
    }

    /// Stamp for the next audio frame of `duration_ms` milliseconds.
    pub fn encode_data_frame(&self, duration_ms: u16) -> u64 {
        self.clock().encode_data_frame(duration_ms)
    }

    /// Stamp for a single command frame.
    pub fn encode_command(
        &self,
        cmd_type: CommandType,
        session_dur_packs: u16,
        duration_ms: u16,
    ) -> u64 {
        self.clock().encode_command(cmd_type, session_dur_packs, duration_ms)
    }

    /// Stamps for a redundant session_end burst.
    pub fn emit_session_end_burst(&self, session_dur_packs: u16) -> Vec<u64> {
        let mut clock = self.clock();
        self.emitter.burst(&mut clock, CommandType::SessionEnd, session_dur_packs)
    }

    /// Stamps for a redundant session_interrupt burst.
    pub fn emit_session_interrupt_burst(&self) -> Vec<u64> {
        let mut clock = self.clock();
        self.emitter.burst(&mut clock, CommandType::SessionInterrupt, 0)
    }

    /// Build a session_end burst and push it through `sink`.
    pub async fn send_session_end<S>(&self, sink: &mut S, session_dur_packs: u16) -> Result<usize>
    where
        S: FrameSink + ?Sized,
    {
        let stamps = self.emit_session_end_burst(session_dur_packs);
        self.emitter.send(sink, &stamps).await
    }

    /// Build a session_interrupt burst and push it through `sink`.
    pub async fn send_session_interrupt<S>(&self, sink: &mut S) -> Result<usize>
    where
        S: FrameSink + ?Sized,
    {
        let stamps = self.emit_session_interrupt_burst();
        self.emitter.send(sink, &stamps).await
    }

    /// End the current session, reporting the packet count the clock recorded.
    pub async fn finish_session<S>(&self, sink: &mut S) -> Result<usize>
    where
        S: FrameSink + ?Sized,
    {
        let stamps = {
            let mut clock = self.clock();
            let packs = clock.session_packs();
            info!(session_id = clock.session_id(), packs, "Finishing outbound session");
            self.emitter.burst(&mut clock, CommandType::SessionEnd, packs)
        };
        self.emitter.send(sink, &stamps).await
    }
}
