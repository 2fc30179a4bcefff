//! Core types for timestamp-multiplexed session signaling.
//!
//! ## Architecture
//!
//! - [`FrameTimestamp`] is the raw 64-bit wire value with bit accessors
//! - [`DecodedFrame`] is the tagged view of a non-sentinel stamp (data or command)
//! - [`CommandType`] maps the 5-bit command code, keeping unknown codes as `Reserved`
//! - [`SessionEvent`] is what the tracker reports to the playback side
//! - [`fields`] holds the bit layout constants
//!
//! ## Usage Example
//!
//! ```rust
//! use ptsmux::types::{CommandType, DecodedFrame, FrameTimestamp};
//!
//! let value = ptsmux::codec::encode_command(5, CommandType::SessionEnd, 200, 100);
//! let stamp = FrameTimestamp::new(value);
//! assert!(stamp.is_protocol_stamp(1));
//!
//! match ptsmux::codec::decode(stamp.value()) {
//!     Some(DecodedFrame::Command { session_id, cmd_type, .. }) => {
//!         assert_eq!(session_id, 5);
//!         assert_eq!(cmd_type, CommandType::SessionEnd);
//!     }
//!     other => panic!("unexpected frame: {:?}", other),
//! }
//! ```

mod event;
pub mod fields;
mod frame;
mod stamp;

pub use event::{EndReason, SessionEvent};
pub use frame::{CommandType, DecodedFrame, FrameKind};
pub use stamp::{FrameTimestamp, pts_after_u16};
