//! Cancellable inactivity timer
//!
//! Every arm bumps an epoch and cancels the token of the previous arm. The spawned
//! task carries the epoch it was armed with; the owner re-checks it under its own
//! lock before acting, so a fire racing a rearm is discarded even if the sleep
//! completed before the cancellation was observed.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug)]
struct ArmedTimer {
    session_id: u8,
    epoch: u64,
    cancel: CancellationToken,
}

/// Single-shot timer that is re-armed on every frame
#[derive(Debug)]
pub struct InactivityTimer {
    window: Duration,
    runtime: Handle,
    epoch: u64,
    armed: Option<ArmedTimer>,
}

impl InactivityTimer {
    pub fn new(window: Duration, runtime: Handle) -> Self {
        Self { window, runtime, epoch: 0, armed: None }
    }

    /// Cancel any pending timer and schedule `on_fire(epoch)` after the window.
    ///
    /// Must be called with the owner's lock held; `on_fire` must take that lock and
    /// confirm the epoch with [`is_current`](Self::is_current) before acting.
    pub fn arm<F>(&mut self, session_id: u8, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.epoch = self.epoch.wrapping_add(1);
        let epoch = self.epoch;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let deadline = tokio::time::Instant::now() + self.window;

        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(session_id, epoch, "Inactivity timer cancelled");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    trace!(session_id, epoch, "Inactivity timer elapsed");
                    on_fire(epoch);
                }
            }
        });

        self.armed = Some(ArmedTimer { session_id, epoch, cancel });
        epoch
    }

    /// Cancel the pending timer, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.cancel.cancel();
        }
    }

    /// Whether `epoch` belongs to the timer that is still pending.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.armed.as_ref().is_some_and(|armed| armed.epoch == epoch)
    }

    /// Forget the pending timer after it fired.
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// Session the pending timer was armed for.
    pub fn armed_session(&self) -> Option<u8> {
        self.armed.as_ref().map(|armed| armed.session_id)
    }

    /// Epoch of the pending timer.
    pub fn armed_epoch(&self) -> Option<u64> {
        self.armed.as_ref().map(|armed| armed.epoch)
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
