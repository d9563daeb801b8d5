//! # Session Wiring
//!
//! Connects the coordinator to its workers and runs a training session.
//!
//! ```text
//!                       ┌─────────────────────────────┐
//!                       │     CoordinatorService      │
//!                       │  registry · topology ·      │
//!                       │  pending-request table      │
//!                       └──────┬───────────────▲──────┘
//!               ChannelSink /  │               │  CoordinatorEvent
//!               stdin pipe     ▼               │  (Inbound, PeerExited)
//!          ┌──────────┐   ┌──────────┐   ┌──────────┐
//!          │ worker-1 │   │ worker-2 │   │ worker-N │
//!          └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! Two transports, one protocol:
//!
//! - [`run_in_process`]: workers are tasks, wired with in-memory sinks.
//! - [`run_supervised`]: workers are child processes speaking line-framed
//!   JSON over their stdin/stdout.
//!
//! Either way the session ends when every worker has exited or shutdown is
//! signalled.

pub mod in_process;
pub mod session;
pub mod supervisor;

pub use in_process::run_in_process;
pub use session::{generate_game, prepare_session};
pub use supervisor::run_supervised;

use crate::training::TrainingSummary;
use shared_types::WorkerId;

/// How one worker's session ended.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    pub worker_id: WorkerId,
    /// Scores for an in-process worker; `None` for a child process or a
    /// worker that failed.
    pub summary: Option<TrainingSummary>,
    pub succeeded: bool,
}
