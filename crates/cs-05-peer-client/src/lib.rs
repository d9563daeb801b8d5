//! # Peer Client
//!
//! Linked into every worker. Two jobs:
//!
//! 1. **Ask**: [`PeerClient::ask`] sends a `request` to the coordinator and
//!    suspends the calling task until the matching `aggregate` arrives or the
//!    local deadline passes.
//! 2. **Answer**: every forwarded `request` is answered through a
//!    [`LocalOracle`] with a fire-and-forget `response`.
//!
//! The local deadline is independent of the coordinator's. Neither side
//! tells the other when it gives up.

pub mod calls;
pub mod client;
pub mod errors;
pub mod ports;
pub mod service;

pub use calls::OutboundCallTable;
pub use client::{ClientStats, PeerClient};
pub use errors::AskError;
pub use ports::LocalOracle;
pub use service::{PeerClientService, DEFAULT_SWEEP_INTERVAL};
