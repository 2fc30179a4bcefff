//! Receiver-side session state machine
//!
//! The tracker consumes decoded frames in arrival order and turns them into session
//! lifecycle events. Three independent signals can close a session: a frame from a
//! different session, an explicit session_end or session_interrupt command, and the
//! inactivity timeout. Each session produces at most one end event no matter how many
//! of those signals arrive or how often command bursts are repeated.
//!
//! # Transition rules
//!
//! For every frame of session `S`, in order:
//!
//! 1. If another session is active, it ends (unless its end was already delivered).
//! 2. If `S` is not the active session it becomes active and starts; either way the
//!    inactivity timer is re-armed for `S`.
//! 3. Command frames: session_end ends `S`, session_interrupt interrupts `S`. Each
//!    command type is processed once per session; repeats are collapsed. Unknown
//!    command codes are ignored.
//!
//! # Concurrency
//!
//! All state lives behind one mutex. `process`, `on_timeout`, timer fires and
//! `shutdown` each run their whole transition under that lock, and listener
//! callbacks are invoked before it is released, so events are observed in exactly
//! the order the transitions happened.

mod state;
mod stats;
mod timer;

#[cfg(test)]
mod tests;

pub use state::{SessionState, TrackerPhase};
pub use stats::TrackerStats;
pub use timer::InactivityTimer;

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, trace};

use crate::codec;
use crate::config::SessionConfig;
use crate::listener::SessionListener;
use crate::types::{CommandType, DecodedFrame, EndReason, FrameTimestamp, pts_after_u16};
use crate::{Result, SessionError};

struct TrackerInner {
    state: SessionState,
    timer: InactivityTimer,
    stats: TrackerStats,
    /// Newest base pts seen, for late-frame accounting
    newest_pts: Option<u16>,
}

/// Session lifecycle state machine fed by inbound frame stamps
pub struct SessionTracker {
    inner: Mutex<TrackerInner>,
    listener: Arc<dyn SessionListener>,
    version: u8,
    this: Weak<SessionTracker>,
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("state", &self.state())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl SessionTracker {
    /// Create a tracker on the current tokio runtime.
    ///
    /// The runtime handle is captured so frames may later be processed from threads
    /// outside the runtime, such as an audio engine callback thread.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoRuntime`] when called outside a tokio runtime, or a
    /// configuration error if `config` does not validate.
    pub fn new<L>(listener: L, config: &SessionConfig) -> Result<Arc<Self>>
    where
        L: SessionListener,
    {
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        Self::with_runtime(Arc::new(listener), config, runtime)
    }

    /// Create a tracker whose inactivity timer runs on `runtime`.
    pub fn with_runtime(
        listener: Arc<dyn SessionListener>,
        config: &SessionConfig,
        runtime: Handle,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let timer = InactivityTimer::new(config.inactivity_timeout(), runtime);

        debug!(
            timeout_ms = config.inactivity_timeout_ms,
            version = config.version,
            "Creating session tracker"
        );

        Ok(Arc::new_cyclic(|this| Self {
            inner: Mutex::new(TrackerInner {
                state: SessionState::default(),
                timer,
                stats: TrackerStats::default(),
                newest_pts: None,
            }),
            listener,
            version: config.version,
            this: this.clone(),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        // Recover from poisoning left by a panicking listener
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Feed one raw inbound stamp.
    ///
    /// This is narrower than [`codec::decode`], which accepts any non-zero value. Here
    /// the sentinel 0 is dropped, and so is any stamp without the origin marker, with
    /// the reserved top bit set, or carrying a version other than the configured one.
    /// Dropped stamps are only counted (`sentinel_frames`, `foreign_frames`). Callers
    /// that need to track stamps of another version should decode them and call
    /// [`process`](Self::process) directly.
    pub fn process_frame(&self, stamp: u64) {
        let stamp = FrameTimestamp::new(stamp);
        if stamp.is_sentinel() {
            self.lock().stats.sentinel_frames += 1;
            return;
        }
        if !stamp.is_protocol_stamp(self.version) {
            trace!(stamp = format_args!("{:#018x}", stamp.value()), "Ignoring foreign stamp");
            self.lock().stats.foreign_frames += 1;
            return;
        }
        if let Some(frame) = codec::decode(stamp.value()) {
            self.process(frame);
        }
    }

    /// Drive the state machine with one decoded frame.
    pub fn process(&self, frame: DecodedFrame) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let session_id = frame.session_id();
        inner.stats.frames_processed += 1;
        trace!(?frame, "Processing frame");

        let pts = frame.base_pts();
        match inner.newest_pts {
            Some(newest) if pts_after_u16(newest, pts) => inner.stats.late_frames += 1,
            _ => inner.newest_pts = Some(pts),
        }

        // Rule 1: a different session closes the active one
        if let Some(current) = inner.state.current_session_id {
            if current != session_id {
                if inner.state.has_ended(current) {
                    trace!(session_id = current, "Boundary after session already ended");
                } else {
                    info!(session_id = current, next = session_id, "Session ended at boundary");
                    inner.stats.ended_by_boundary += 1;
                    self.listener.on_session_end(current, EndReason::Boundary);
                }
                inner.state.last_ended_session_id = Some(current);
            }
        }

        // Rule 2: start or keep alive
        if inner.state.current_session_id != Some(session_id) {
            inner.state.current_session_id = Some(session_id);
            info!(session_id, "Session started");
            inner.stats.sessions_started += 1;
            self.listener.on_session_start(session_id);
        }
        self.arm_timer(inner, session_id);

        // Rule 3: commands
        if let DecodedFrame::Command { cmd_type, .. } = frame {
            match cmd_type {
                CommandType::SessionEnd => self.handle_end_command(inner, session_id),
                CommandType::SessionInterrupt => self.handle_interrupt_command(inner, session_id),
                CommandType::Reserved(code) => {
                    debug!(session_id, code, "Ignoring unknown command");
                    inner.stats.unknown_commands += 1;
                }
            }
        }
    }

    fn handle_end_command(&self, inner: &mut TrackerInner, session_id: u8) {
        if inner.state.last_end_command_session_id == Some(session_id) {
            inner.stats.duplicate_commands += 1;
            return;
        }
        inner.state.last_end_command_session_id = Some(session_id);
        inner.timer.cancel();

        // An earlier interrupt or timeout already closed this session
        if inner.state.has_ended(session_id) {
            debug!(session_id, "End command for session that already ended");
            return;
        }
        info!(session_id, "Session ended by command");
        inner.state.last_ended_session_id = Some(session_id);
        inner.stats.ended_by_command += 1;
        self.listener.on_session_end(session_id, EndReason::Command);
    }

    fn handle_interrupt_command(&self, inner: &mut TrackerInner, session_id: u8) {
        if inner.state.last_interrupt_command_session_id == Some(session_id) {
            inner.stats.duplicate_commands += 1;
            return;
        }
        inner.state.last_interrupt_command_session_id = Some(session_id);
        inner.timer.cancel();

        info!(session_id, "Session interrupted");
        inner.state.last_ended_session_id = Some(session_id);
        inner.stats.interrupts += 1;
        self.listener.on_session_interrupt(session_id);
    }

    fn arm_timer(&self, inner: &mut TrackerInner, session_id: u8) {
        let this = self.this.clone();
        inner.timer.arm(session_id, move |epoch| {
            if let Some(tracker) = this.upgrade() {
                tracker.timer_fired(session_id, epoch);
            }
        });
    }

    fn timer_fired(&self, session_id: u8, epoch: u64) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if !inner.timer.is_current(epoch) {
            trace!(session_id, epoch, "Discarding stale timer fire");
            inner.stats.stale_timer_fires += 1;
            return;
        }
        inner.timer.disarm();
        self.expire(inner, session_id);
    }

    /// Inactivity timeout for `session_id`.
    ///
    /// Ends the session if it is still the active one and its end has not been
    /// delivered yet; otherwise does nothing.
    pub fn on_timeout(&self, session_id: u8) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.timer.armed_session() == Some(session_id) {
            inner.timer.cancel();
        }
        self.expire(inner, session_id);
    }

    fn expire(&self, inner: &mut TrackerInner, session_id: u8) {
        if inner.state.current_session_id != Some(session_id) {
            debug!(
                session_id,
                current = ?inner.state.current_session_id,
                "Timeout for inactive session"
            );
            return;
        }
        if inner.state.has_ended(session_id) {
            trace!(session_id, "Timeout after session already ended");
            return;
        }
        info!(session_id, window = ?inner.timer.window(), "Session ended by inactivity timeout");
        inner.state.last_ended_session_id = Some(session_id);
        inner.stats.ended_by_timeout += 1;
        self.listener.on_session_end(session_id, EndReason::Timeout);
    }

    /// Cancel any pending timer and return to idle with all duplicate memory cleared.
    ///
    /// Idempotent. The tracker can be used again afterwards.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        inner.timer.cancel();
        if !inner.state.is_idle() {
            debug!(state = ?inner.state, "Resetting session tracker");
        }
        inner.state.reset();
        inner.newest_pts = None;
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn phase(&self) -> TrackerPhase {
        self.lock().state.phase()
    }

    pub fn stats(&self) -> TrackerStats {
        self.lock().stats
    }

    /// Whether an inactivity timer is pending.
    pub fn timer_pending(&self) -> bool {
        self.lock().timer.armed_session().is_some()
    }
}
