use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// Input or target does not match the network's dimensions.
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Action index outside `0..ACTIONS`.
    #[error("Invalid action index: {0}")]
    InvalidAction(usize),

    /// No prediction to choose from.
    #[error("No prediction available")]
    NoPrediction,

    /// Network output could not be read back from the backend.
    #[error("Tensor readback failed: {0}")]
    Tensor(String),
}
