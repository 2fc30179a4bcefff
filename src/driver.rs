//! Driver pumps an inbound stamp stream into a session tracker

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::tracker::SessionTracker;

/// Handle to a running driver task
#[derive(Debug)]
pub struct DriverHandle {
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
    /// Resolves to the number of stamps processed
    pub task: JoinHandle<u64>,
}

impl DriverHandle {
    /// Cancel the driver and wait for it to finish.
    pub async fn stop(self) -> crate::Result<u64> {
        self.cancel.cancel();
        self.task.await.map_err(|e| crate::SessionError::cancelled(e.to_string()))
    }
}

/// Driver feeds stamps delivered by the audio transport into a tracker
///
/// The transport side usually pushes stamps from its callback into a channel; the
/// driver owns the receiving end and serializes them into the tracker.
pub struct FrameDriver;

impl FrameDriver {
    /// Spawn a task that processes every stamp from `stamps` until the stream ends or
    /// the returned token is cancelled. The tracker is shut down when the task exits.
    pub fn spawn<S>(stamps: S, tracker: Arc<SessionTracker>) -> DriverHandle
    where
        S: Stream<Item = u64> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let task = tokio::spawn(async move { Self::pump_task(stamps, tracker, cancel_task).await });

        DriverHandle { cancel, task }
    }

    async fn pump_task<S>(
        stamps: S,
        tracker: Arc<SessionTracker>,
        cancel: CancellationToken,
    ) -> u64
    where
        S: Stream<Item = u64> + Send + 'static,
    {
        info!("Frame driver started");
        let mut stamps = std::pin::pin!(stamps);
        let mut frame_count = 0u64;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Frame driver cancelled");
                    break;
                }
                next = stamps.next() => next,
            };

            match next {
                Some(stamp) => {
                    frame_count += 1;
                    trace!("Stamp {}: {:#018x}", frame_count, stamp);
                    tracker.process_frame(stamp);
                }
                None => {
                    debug!("Stamp stream ended");
                    break;
                }
            }
        }

        tracker.shutdown();
        info!("Frame driver ended (processed {} stamps)", frame_count);
        frame_count
    }
}
