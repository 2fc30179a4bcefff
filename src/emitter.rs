//! Redundant command bursts for a lossy transport
//!
//! A single lost session_end frame would leave the receiver waiting for its
//! inactivity timeout, so every command goes out as a burst of identical frames.
//! Receivers collapse the duplicates into one lifecycle event.

use tracing::{debug, warn};

use crate::clock::FrameClock;
use crate::config::SessionConfig;
use crate::types::CommandType;
use crate::{Result, SessionError};

/// Boxed error returned by a transport
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Outbound side of the audio transport
///
/// The transport attaches `stamp` as the frame's presentation timestamp. Command
/// frames are sent with an empty payload.
#[async_trait::async_trait]
pub trait FrameSink: Send {
    async fn send_frame(
        &mut self,
        payload: &[u8],
        stamp: u64,
    ) -> std::result::Result<(), SinkError>;
}

/// Builds bursts of redundant command frames
#[derive(Debug, Clone, Copy)]
pub struct CommandEmitter {
    burst_size: usize,
    duration_ms: u16,
}

impl Default for CommandEmitter {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl CommandEmitter {
    pub fn new(burst_size: usize, duration_ms: u16) -> Self {
        Self { burst_size, duration_ms }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.burst_size, config.command_duration_ms)
    }

    pub fn burst_size(&self) -> usize {
        self.burst_size
    }

    /// Stamp `burst_size` identical command frames on `clock`.
    ///
    /// Each frame advances base pts by the configured duration, so copies differ
    /// only in base pts when that duration is non-zero.
    pub fn burst(
        &self,
        clock: &mut FrameClock,
        cmd_type: CommandType,
        session_dur_packs: u16,
    ) -> Vec<u64> {
        let stamps: Vec<u64> = (0..self.burst_size)
            .map(|_| clock.encode_command(cmd_type, session_dur_packs, self.duration_ms))
            .collect();
        debug!(
            session_id = clock.session_id(),
            ?cmd_type,
            session_dur_packs,
            count = stamps.len(),
            "Built command burst"
        );
        stamps
    }

    /// Push an already stamped burst through a sink, stopping at the first failure.
    ///
    /// Returns the number of frames sent.
    pub async fn send<S>(&self, sink: &mut S, stamps: &[u64]) -> Result<usize>
    where
        S: FrameSink + ?Sized,
    {
        for (index, stamp) in stamps.iter().enumerate() {
            if let Err(e) = sink.send_frame(&[], *stamp).await {
                warn!(index, total = stamps.len(), "Frame sink rejected command frame: {}", e);
                return Err(SessionError::sink_failed_with_source(
                    "transport refused command frame",
                    index,
                    e,
                ));
            }
        }
        Ok(stamps.len())
    }
}
