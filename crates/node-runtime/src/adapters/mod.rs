//! # Adapters
//!
//! Implementations of the agent's driven ports in terms of the protocol
//! crates. The agent knows nothing about correlation ids or the coordinator;
//! this is where the two meet.

pub mod peer_predictions;

pub use peer_predictions::ClientPredictions;
