//! Lifecycle callback interface for the playback side

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use crate::types::{EndReason, SessionEvent};

/// Receives session lifecycle callbacks from a [`SessionTracker`](crate::SessionTracker).
///
/// Callbacks run on whichever thread drove the transition (an audio callback thread
/// or the timer task) while the tracker lock is held. Implementations must be quick
/// and must not call back into the tracker.
pub trait SessionListener: Send + Sync + 'static {
    fn on_session_start(&self, session_id: u8);

    fn on_session_end(&self, session_id: u8, reason: EndReason);

    fn on_session_interrupt(&self, session_id: u8);

    /// Dispatch a [`SessionEvent`] to the matching callback.
    fn dispatch(&self, event: SessionEvent) {
        match event {
            SessionEvent::Started { session_id } => self.on_session_start(session_id),
            SessionEvent::Ended { session_id, reason } => self.on_session_end(session_id, reason),
            SessionEvent::Interrupted { session_id } => self.on_session_interrupt(session_id),
        }
    }
}

/// Listener that forwards every event into an unbounded channel.
///
/// Use [`EventChannel::new`] to get the listener plus a stream of events for async
/// consumers.
#[derive(Debug, Clone)]
pub struct EventChannel {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventChannel {
    pub fn new() -> (Self, impl Stream<Item = SessionEvent> + Send + Unpin + 'static) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, UnboundedReceiverStream::new(rx))
    }

    fn send(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            debug!(?event, "Event receiver dropped, discarding session event");
        }
    }
}

impl SessionListener for EventChannel {
    fn on_session_start(&self, session_id: u8) {
        self.send(SessionEvent::Started { session_id });
    }

    fn on_session_end(&self, session_id: u8, reason: EndReason) {
        self.send(SessionEvent::Ended { session_id, reason });
    }

    fn on_session_interrupt(&self, session_id: u8) {
        self.send(SessionEvent::Interrupted { session_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn channel_preserves_order() {
        let (listener, events) = EventChannel::new();
        listener.dispatch(SessionEvent::Started { session_id: 1 });
        listener.on_session_end(1, EndReason::Boundary);
        listener.on_session_interrupt(2);
        drop(listener);

        let collected: Vec<_> = events.collect().await;
        assert_eq!(
            collected,
            vec![
                SessionEvent::Started { session_id: 1 },
                SessionEvent::Ended { session_id: 1, reason: EndReason::Boundary },
                SessionEvent::Interrupted { session_id: 2 },
            ]
        );
    }

    #[test]
    fn dropped_receiver_is_tolerated() {
        let (listener, events) = EventChannel::new();
        drop(events);
        listener.on_session_start(9);
    }
}
