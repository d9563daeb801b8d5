//! Transport errors.

use thiserror::Error;

/// Failures while delivering or framing a message.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The receiving side of the sink is gone.
    #[error("Sink closed")]
    Closed,

    /// Encoded envelope exceeds the frame limit.
    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Underlying byte stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame is not a valid envelope.
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
