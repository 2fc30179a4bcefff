//! Error types for session signaling.
//!
//! The timestamp codec and the session state machine never fail: field widths are
//! enforced by masking, and duplicate or unknown commands are defined no-ops. Errors
//! only exist at the edges of the crate, where it touches configuration files, the
//! async runtime, and the audio transport that carries outgoing frames.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: Invalid or unreadable session configuration
//! - **Sink Errors**: The transport refused a frame while a command burst was in flight
//! - **Runtime Errors**: No tokio runtime available to host the inactivity timer
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use ptsmux::SessionError;
//!
//! let error = SessionError::sink_failed("transport closed", 3);
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for session signaling operations.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Main error type for session signaling operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SessionError {
    #[error("Invalid session configuration: {details}")]
    Config { details: String },

    #[error("Configuration file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame sink rejected frame {index} of burst: {reason}")]
    Sink {
        reason: String,
        index: usize,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("No tokio runtime available to drive the inactivity timer")]
    NoRuntime,

    #[error("Operation cancelled: {context}")]
    Cancelled { context: String },
}

impl SessionError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Sink { .. } => true,
            SessionError::Cancelled { .. } => true,
            SessionError::Config { .. } => false,
            SessionError::File { .. } => false,
            SessionError::NoRuntime => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SessionError::Config { .. } => vec![
                "Check burst_size is at least 1",
                "Check inactivity_timeout_ms is at least 1",
                "Use protocol version 1 unless the peer speaks a newer one",
            ],
            SessionError::File { .. } => vec![
                "Check the configuration file exists and is readable",
                "Check file permissions",
            ],
            SessionError::Sink { .. } => vec![
                "Check the audio transport is still connected",
                "Resend the burst; receivers collapse duplicate commands",
                "Rely on the receiver inactivity timeout if the transport stays down",
            ],
            SessionError::NoRuntime => vec![
                "Construct the tracker from inside a tokio runtime",
                "Enter a runtime with Handle::enter before construction",
            ],
            SessionError::Cancelled { .. } => {
                vec!["Restart the driver task", "Check shutdown ordering of the pipeline"]
            }
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        SessionError::Config { details: details.into() }
    }

    /// Helper constructor for configuration file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        SessionError::File { path, source }
    }

    /// Helper constructor for sink errors.
    pub fn sink_failed(reason: impl Into<String>, index: usize) -> Self {
        SessionError::Sink { reason: reason.into(), index, source: None }
    }

    /// Helper constructor for sink errors with source.
    pub fn sink_failed_with_source(
        reason: impl Into<String>,
        index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        SessionError::Sink { reason: reason.into(), index, source: Some(source) }
    }

    /// Helper constructor for cancellation errors.
    pub fn cancelled(context: impl Into<String>) -> Self {
        SessionError::Cancelled { context: context.into() }
    }
}

impl From<serde_yaml_ng::Error> for SessionError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        SessionError::Config { details: format!("YAML parsing failed: {}", err) }
    }
}
