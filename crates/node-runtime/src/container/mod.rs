//! # Runtime Container
//!
//! Configuration shared by the coordinator and every worker.
//!
//! The coordinator loads it (file, then environment overrides), resolves the
//! game layout once, and hands the resolved copy to each worker so that all
//! agents train on the same board.

pub mod config;

pub use config::{ConfigError, ProtocolConfig, RuntimeConfig, RUNTIME_CONFIG_ENV, WORKER_ID_ENV};
