//! Session signaling multiplexed into audio frame timestamps.
//!
//! Real-time audio transports usually let a sender attach exactly one 64-bit
//! presentation timestamp to each frame and nothing else. ptsmux packs dialogue
//! session bookkeeping into that integer, next to a running 16-bit audio clock, so a
//! receiver can tell when a turn starts, ends, or is interrupted without any side
//! channel.
//!
//! # Features
//!
//! - **Bit-exact codec**: [`codec::encode`] / [`codec::decode`] for the version 1 layout
//! - **Sender clock**: per-session sentence numbering and base pts via [`StampSender`]
//! - **Redundant commands**: bursts of identical session_end / session_interrupt frames
//! - **Session tracking**: [`SessionTracker`] reconciles session boundaries, commands and
//!   an inactivity timeout into exactly one end event per session
//!
//! ## Example
//!
//! ```rust,no_run
//! use ptsmux::{SessionConfig, StampReceiver, StampSender};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> ptsmux::Result<()> {
//!     let config = SessionConfig::default();
//!     let sender = StampSender::new(&config)?;
//!     let (receiver, mut events) = StampReceiver::with_events(&config)?;
//!
//!     sender.set_session(1);
//!     for _ in 0..3 {
//!         // The transport would carry this stamp alongside a 20 ms audio frame
//!         receiver.process_frame(sender.encode_data_frame(20));
//!     }
//!     for stamp in sender.emit_session_end_burst(3) {
//!         receiver.process_frame(stamp);
//!     }
//!
//!     while let Some(event) = events.next().await {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod codec;
mod error;
pub mod types;

// Sender side
pub mod clock;
pub mod emitter;
pub mod sender;

// Receiver side
pub mod driver;
pub mod listener;
pub mod receiver;
pub mod tracker;

// Configuration and stream adapters
pub mod config;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use clock::FrameClock;
pub use config::SessionConfig;
pub use driver::{DriverHandle, FrameDriver};
pub use emitter::{CommandEmitter, FrameSink, SinkError};
pub use listener::{EventChannel, SessionListener};
pub use receiver::StampReceiver;
pub use sender::StampSender;
pub use stream::DecodeExt;
pub use tracker::{SessionState, SessionTracker, TrackerPhase, TrackerStats};
