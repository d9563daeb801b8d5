//! # Peer Registry
//!
//! Tracks the worker processes attached to the coordinator.
//!
//! - Identifiers are assigned `1, 2, 3, ...` and never reused.
//! - Liveness is flipped by peer-exit events; a dead peer keeps its slot so
//!   its id can never be handed out again.
//! - Queries (`live_ids`, `neighbors`) always read current state; callers
//!   must not cache them across requests.
//!
//! A peer exit does not touch any in-flight exchange. Requests that were
//! waiting on the dead peer close through deadline expiry.

pub mod errors;
pub mod registry;

pub use errors::RegistryError;
pub use registry::PeerRegistry;
