//! # Message Sinks
//!
//! The outbound side of a peer connection.

use crate::error::TransportError;
use shared_types::PeerMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound endpoint for one peer (or for the coordinator, seen from a peer).
///
/// `deliver` must not block: it either enqueues the message or fails.
pub trait MessageSink: Send + Sync {
    /// Enqueue `message` for delivery.
    fn deliver(&self, message: PeerMessage) -> Result<(), TransportError>;
}

/// Shared, type-erased sink.
pub type SharedSink = Arc<dyn MessageSink>;

/// Sink backed by an unbounded tokio channel.
///
/// Used directly for in-process peers, and in front of a writer task for
/// peers behind a byte stream (see [`crate::spawn_writer`]).
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<PeerMessage>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<PeerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Wrap an existing sender.
    #[must_use]
    pub fn new(sender: mpsc::UnboundedSender<PeerMessage>) -> Self {
        Self { sender }
    }

    /// Whether the receiving side has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl MessageSink for ChannelSink {
    fn deliver(&self, message: PeerMessage) -> Result<(), TransportError> {
        self.sender.send(message).map_err(|_| TransportError::Closed)
    }
}
