//! # Driven Ports
//!
//! What the host worker must provide to the client.

use shared_types::{Payload, ProtocolError};

/// Produces this worker's answer to a peer's request.
///
/// Called on the client's dispatch task; while it runs no other inbound
/// message is handled, so it should return quickly.
pub trait LocalOracle: Send + Sync {
    fn answer(&self, request: &Payload) -> Result<Payload, ProtocolError>;
}
