//! Counters describing what the tracker has seen

use serde::{Deserialize, Serialize};

/// Snapshot of tracker counters. Counters survive [`shutdown`](super::SessionTracker::shutdown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackerStats {
    /// Decoded frames fed through the state machine
    pub frames_processed: u64,
    /// Stamps equal to 0 (no metadata)
    pub sentinel_frames: u64,
    /// Non-zero stamps without the origin marker or with another protocol version
    pub foreign_frames: u64,
    /// Frames whose base pts is older than the newest already seen
    pub late_frames: u64,
    pub sessions_started: u64,
    pub ended_by_boundary: u64,
    pub ended_by_command: u64,
    pub ended_by_timeout: u64,
    pub interrupts: u64,
    /// Repeated session_end / session_interrupt commands that were collapsed
    pub duplicate_commands: u64,
    /// Commands with no assigned meaning
    pub unknown_commands: u64,
    /// Timer fires that were outrun by a rearm or cancel
    pub stale_timer_fires: u64,
}

impl TrackerStats {
    pub fn sessions_ended(&self) -> u64 {
        self.ended_by_boundary + self.ended_by_command + self.ended_by_timeout
    }
}
