//! # Telemetry
//!
//! Logging setup shared by the coordinator and its workers.
//!
//! Logs always go to **stderr**: a worker's stdout carries protocol frames.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cs_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_role("worker", Some(3));
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CS_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `CS_JSON_LOGS` | `false` | JSON lines instead of human-readable output |
//! | `CS_SERVICE_NAME` | `collective-sarsa` | Service name logged at startup |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}
