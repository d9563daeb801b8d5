//! # Deep SARSA Agent
//!
//! The decision-making collaborator hosted by every worker.
//!
//! - [`QNetwork`]: fully connected ReLU network mapping a flattened grid to
//!   one action-value per action, trained with Adam on squared error.
//! - [`DeepSarsaAgent`]: epsilon-greedy policy. The greedy branch consults
//!   peers through [`PeerPredictions`] and picks with [`choose_best_action`].
//! - [`SharedModelOracle`]: answers peer requests from the same model.
//!
//! Peer failures never reach the agent as errors: a failed or expired ask is
//! an empty peer list, and the decision is made locally.

pub mod agent;
pub mod config;
pub mod errors;
pub mod network;
pub mod oracle;
pub mod policy;
pub mod ports;

pub use agent::DeepSarsaAgent;
pub use config::AgentConfig;
pub use errors::AgentError;
pub use network::{QNetwork, SharedModel};
pub use oracle::SharedModelOracle;
pub use policy::choose_best_action;
pub use ports::{NoPeers, PeerPredictions};

/// Number of discrete actions (left, down, up, right).
pub const ACTIONS: usize = 4;
