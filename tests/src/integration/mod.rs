//! # Integration Scenarios
//!
//! Coordinator, topology, pending-request table and peer clients wired
//! together exactly as a session wires them, minus the training loop.

pub mod fixtures;

#[cfg(test)]
mod peer_failure;
#[cfg(test)]
mod protocol_flows;
#[cfg(test)]
mod stdio_transport;
