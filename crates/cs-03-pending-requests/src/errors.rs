use shared_types::{CorrelationId, ProtocolError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PendingError {
    /// No open entry for this id: already closed, expired, or never opened.
    #[error("Stale correlation: {correlation_id}")]
    Stale { correlation_id: CorrelationId },
}

impl From<PendingError> for ProtocolError {
    fn from(err: PendingError) -> Self {
        match err {
            PendingError::Stale { correlation_id } => {
                ProtocolError::StaleCorrelation { correlation_id }
            }
        }
    }
}
