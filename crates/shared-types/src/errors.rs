//! # Error Types
//!
//! Protocol-level error taxonomy. None of these is fatal: every handler that
//! observes one logs it and drops the offending message.

use crate::ids::{CorrelationId, WorkerId};
use thiserror::Error;

/// Errors observed while routing peer messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// A `response` or `aggregate` references an exchange that is not open
    /// (already closed, expired, or never opened).
    #[error("Stale correlation: no open exchange for {correlation_id}")]
    StaleCorrelation { correlation_id: CorrelationId },

    /// Message `type` outside `request` / `response` / `aggregate`,
    /// or a known type arriving where it has no meaning.
    #[error("Unrecognized message type: {kind}")]
    UnrecognizedMessage { kind: String },

    /// A selected recipient is no longer live by send time.
    #[error("Peer unavailable: {worker_id}")]
    PeerUnavailable { worker_id: WorkerId },

    /// Payload could not be encoded or decoded.
    #[error("Payload error: {0}")]
    Payload(String),
}

impl ProtocolError {
    /// Response carried no `correlatesTo` marker.
    #[must_use]
    pub fn missing_correlation(kind: &str) -> Self {
        Self::UnrecognizedMessage {
            kind: format!("{kind} without correlatesTo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_peer() {
        let err = ProtocolError::PeerUnavailable {
            worker_id: WorkerId(7),
        };
        assert_eq!(err.to_string(), "Peer unavailable: worker-7");
    }

    #[test]
    fn test_missing_correlation_is_unrecognized() {
        let err = ProtocolError::missing_correlation("response");
        assert!(matches!(err, ProtocolError::UnrecognizedMessage { .. }));
    }
}
