use shared_bus::TransportError;
use shared_types::{CorrelationId, ProtocolError};
use thiserror::Error;

/// Why an [`ask`](crate::PeerClient::ask) produced no peer answers.
#[derive(Debug, Error)]
pub enum AskError {
    /// The request never left this process.
    #[error("Coordinator unreachable: {0}")]
    Transport(#[from] TransportError),

    /// Local deadline passed before the aggregate arrived.
    #[error("No aggregate for {correlation_id} before the local deadline")]
    Expired { correlation_id: CorrelationId },

    /// The coordinator connection closed; no aggregate can arrive.
    #[error("Coordinator connection closed, {correlation_id} abandoned")]
    Closed { correlation_id: CorrelationId },

    /// The aggregate arrived but could not be read.
    #[error("Malformed aggregate: {0}")]
    Protocol(#[from] ProtocolError),
}
