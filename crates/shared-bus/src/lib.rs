//! # Shared Bus - Transport Between Coordinator and Peers
//!
//! Moves [`PeerMessage`] envelopes between the coordinator and its workers.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────┐  deliver()   ┌──────────────┐   write_frame()   ┌──────────┐
//! │ Coordinator  │ ───────────▶ │ ChannelSink  │ ────────────────▶ │  pipe /  │
//! │ or PeerClient│              │ (unbounded)  │   writer task     │  socket  │
//! └──────────────┘              └──────────────┘                   └──────────┘
//!                                                 read_frame()          │
//!                   dispatch loop ◀─────────────────────────────────────┘
//! ```
//!
//! - **Non-blocking sends:** [`MessageSink::deliver`] never waits, so the
//!   coordinator's handler runs to completion without suspension.
//! - **Best effort:** a closed sink reports [`TransportError::Closed`]; callers
//!   log and move on. There are no retries.
//! - **Line framing:** one JSON envelope per line, at most [`MAX_FRAME_BYTES`].

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod framing;
pub mod sink;

pub use error::TransportError;
pub use framing::{pump_frames, read_frame, spawn_writer, write_frame};
pub use shared_types::{PeerMessage, PROTOCOL_VERSION};
pub use sink::{ChannelSink, MessageSink, SharedSink};

/// Largest encoded envelope accepted on a byte stream (1 MiB).
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version() {
        assert_eq!(PROTOCOL_VERSION, 1);
    }

    #[test]
    fn test_frame_limit() {
        assert_eq!(MAX_FRAME_BYTES, 1_048_576);
    }
}
