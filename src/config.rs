//! Session signaling configuration
//!
//! Defaults match the protocol constants: a 500 ms inactivity window, bursts of 10
//! command frames with zero audio duration, protocol version 1.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::types::fields::{PROTOCOL_VERSION, header};
use crate::{Result, SessionError};

pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_BURST_SIZE: usize = 10;
/// Largest accepted burst; bursts are built while the sender's clock is locked
pub const MAX_BURST_SIZE: usize = 255;

/// Tunables for both sides of the protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Receiver closes a silent session after this many milliseconds
    pub inactivity_timeout_ms: u64,
    /// Redundant copies per command burst
    pub burst_size: usize,
    /// Audio duration each command frame advances base pts by
    pub command_duration_ms: u16,
    /// Protocol version written by the sender and accepted by the receiver
    pub version: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            burst_size: DEFAULT_BURST_SIZE,
            command_duration_ms: 0,
            version: PROTOCOL_VERSION,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SessionConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading session config");
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| SessionError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.burst_size == 0 {
            return Err(SessionError::config("burst_size must be at least 1"));
        }
        if self.burst_size > MAX_BURST_SIZE {
            return Err(SessionError::config(format!(
                "burst_size {} exceeds the maximum of {MAX_BURST_SIZE}",
                self.burst_size
            )));
        }
        if self.inactivity_timeout_ms == 0 {
            return Err(SessionError::config("inactivity_timeout_ms must be at least 1"));
        }
        if self.version == 0 || self.version as u64 > header::VERSION_MASK {
            return Err(SessionError::config(format!(
                "version {} does not fit the 4-bit version field",
                self.version
            )));
        }
        Ok(())
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms)
    }
}
