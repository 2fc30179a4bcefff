//! FrameTimestamp newtype for raw wire values

use serde::{Deserialize, Serialize};

use super::fields::header;

/// Raw 64-bit presentation timestamp as it travels on the wire.
///
/// A value of exactly 0 is the "no metadata attached" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FrameTimestamp(pub u64);

impl FrameTimestamp {
    /// Create a new FrameTimestamp from a raw u64 value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Check if this is the "no metadata" sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.0 == 0
    }

    /// Check if a specific bit is set.
    pub fn is_set(&self, bit: u32) -> bool {
        (self.0 & (1 << bit)) != 0
    }

    /// Extract a field given its shift and (post-shift) mask.
    pub fn field(&self, shift: u32, mask: u64) -> u64 {
        (self.0 >> shift) & mask
    }

    /// Protocol version stored in bits 61-58.
    pub fn version(&self) -> u8 {
        self.field(header::VERSION_SHIFT, header::VERSION_MASK) as u8
    }

    /// Whether the value carries the origin marker with a clear reserved top bit and
    /// the expected protocol version.
    pub fn is_protocol_stamp(&self, expected_version: u8) -> bool {
        !self.is_set(header::RESERVED_BIT)
            && self.is_set(header::ORIGIN_BIT)
            && self.version() == expected_version
    }

    /// Get the raw u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for FrameTimestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<FrameTimestamp> for u64 {
    fn from(stamp: FrameTimestamp) -> Self {
        stamp.0
    }
}

/// Compare base pts counters in u16 space with wraparound using the half-range rule.
/// Returns true if `a` is considered newer than `b`.
pub fn pts_after_u16(a: u16, b: u16) -> bool {
    if a == b {
        return false;
    }
    a.wrapping_sub(b) < 0x8000
}
