use shared_types::WorkerId;
use thiserror::Error;

/// Registry bookkeeping errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Id is (or was) already registered.
    #[error("Duplicate peer: {0} is already registered")]
    DuplicatePeer(WorkerId),
}
