//! # Node Runtime Library
//!
//! Bootstrap for a collective-SARSA training session. The `node-runtime`
//! binary is a thin CLI over this library; integration tests drive the same
//! entry points with in-memory transports.
//!
//! - `container/` - Runtime configuration (TOML + environment)
//! - `adapters/` - Agent ports implemented over the peer client
//! - `training/` - Episode loop and results file
//! - `worker/` - One peer: agent, environment, peer client
//! - `wiring/` - Coordinator-to-worker plumbing, in-process or supervised
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then environment overrides)
//! 2. Resolve the game layout once and write the results header
//! 3. Register every worker with the coordinator, then start them
//! 4. Route prediction traffic until every worker has exited

#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod container;
pub mod training;
pub mod wiring;
pub mod worker;

pub use container::{ConfigError, RuntimeConfig};
pub use training::{TrainingSummary, RESULTS_WINDOW};
pub use wiring::{generate_game, prepare_session, run_in_process, run_supervised, WorkerReport};
pub use worker::WorkerNode;
