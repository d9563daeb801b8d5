//! # Shared Types Crate
//!
//! Protocol vocabulary shared by the coordinator and every peer worker.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: ids, the wire envelope and payload types
//!   live here and nowhere else.
//! - **Opaque Payloads**: the coordination core never looks inside a
//!   [`Payload`]; only the agent collaborator encodes and decodes it.
//! - **Correlation Authority**: a `response` or `aggregate` is matched to its
//!   exchange solely through `correlates_to`.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod payload;

pub use entities::*;
pub use envelope::{MessageKind, PeerMessage, PROTOCOL_VERSION};
pub use errors::*;
pub use ids::{CorrelationId, WorkerId};
pub use payload::Payload;
