//! Receiver-facing API

use futures::Stream;
use std::sync::Arc;

use crate::Result;
use crate::config::SessionConfig;
use crate::listener::{EventChannel, SessionListener};
use crate::tracker::{SessionState, SessionTracker, TrackerStats};
use crate::types::SessionEvent;

/// Inbound side: turns per-frame stamps into session lifecycle callbacks.
///
/// Cheap to clone; clones share one tracker.
#[derive(Debug, Clone)]
pub struct StampReceiver {
    tracker: Arc<SessionTracker>,
}

impl StampReceiver {
    /// Build a receiver that reports to `listener`. Must be called inside a tokio
    /// runtime.
    pub fn with_listener<L>(listener: L, config: &SessionConfig) -> Result<Self>
    where
        L: SessionListener,
    {
        Ok(Self { tracker: SessionTracker::new(listener, config)? })
    }

    /// Build a receiver whose events are delivered as a stream.
    pub fn with_events(
        config: &SessionConfig,
    ) -> Result<(Self, impl Stream<Item = SessionEvent> + Send + Unpin + use<>)> {
        let (listener, events) = EventChannel::new();
        Ok((Self::with_listener(listener, config)?, events))
    }

    /// Handle one inbound frame's stamp. Stamp 0 carries no metadata and is ignored.
    pub fn process_frame(&self, stamp: u64) {
        self.tracker.process_frame(stamp);
    }

    /// Cancel the inactivity timer and forget all session state.
    pub fn shutdown(&self) {
        self.tracker.shutdown();
    }

    pub fn state(&self) -> SessionState {
        self.tracker.state()
    }

    pub fn stats(&self) -> TrackerStats {
        self.tracker.stats()
    }

    pub fn tracker(&self) -> &Arc<SessionTracker> {
        &self.tracker
    }
}

impl From<Arc<SessionTracker>> for StampReceiver {
    fn from(tracker: Arc<SessionTracker>) -> Self {
        Self { tracker }
    }
}
