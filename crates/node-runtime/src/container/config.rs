//! # Runtime Configuration
//!
//! Loaded from TOML, every field defaulted:
//!
//! ```toml
//! workers = 4
//! topology = "broadcast"
//! results_path = "./results"
//!
//! [protocol]
//! request_ttl_secs = 20
//! sweep_interval_ms = 500
//!
//! [agent]
//! episodes = 100
//!
//! [game]
//! width = 5
//! height = 5
//! enemies = 3
//! ```
//!
//! Environment overrides: `CS_WORKERS`, `CS_TOPOLOGY`, `CS_RESULTS_PATH`.

use cs_02_topology::TopologyMode;
use cs_06_agent::AgentConfig;
use cs_07_gridworld::{EnvironmentError, GameConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Resolved configuration handed from coordinator to worker processes (JSON).
pub const RUNTIME_CONFIG_ENV: &str = "CS_RUNTIME_CONFIG";

/// Worker number assigned by the coordinator before the child starts.
pub const WORKER_ID_ENV: &str = "CS_WORKER_ID";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} is not set")]
    MissingEnv(&'static str),

    #[error("Invalid worker config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("At least one worker is required")]
    ZeroWorkers,

    #[error("request_ttl_secs must be greater than zero")]
    ZeroTtl,

    #[error("sweep_interval_ms must be greater than zero")]
    ZeroSweepInterval,

    #[error("Invalid game: {0}")]
    Game(#[from] EnvironmentError),
}

/// The `[protocol]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Lifetime of a request, on the coordinator and on the asking worker.
    pub request_ttl_secs: u64,
    /// Period of the deadline sweep in both processes.
    pub sweep_interval_ms: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            request_ttl_secs: 20,
            sweep_interval_ms: 500,
        }
    }
}

impl ProtocolConfig {
    #[must_use]
    pub fn request_ttl(&self) -> Duration {
        Duration::from_secs(self.request_ttl_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of worker agents.
    pub workers: usize,
    /// Fan-out rule for prediction requests.
    pub topology: TopologyMode,
    /// File the training scores are appended to.
    pub results_path: PathBuf,
    pub protocol: ProtocolConfig,
    pub agent: AgentConfig,
    pub game: GameConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            topology: TopologyMode::default(),
            results_path: PathBuf::from("./results"),
            protocol: ProtocolConfig::default(),
            agent: AgentConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load from `path` (defaults when `None`), apply environment overrides
    /// and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `CS_WORKERS`, `CS_TOPOLOGY` and `CS_RESULTS_PATH`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup("CS_WORKERS") {
            self.workers = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Env {
                    var: "CS_WORKERS",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup("CS_TOPOLOGY") {
            self.topology = value.parse().map_err(|e: cs_02_topology::ParseTopologyError| {
                ConfigError::Env {
                    var: "CS_TOPOLOGY",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup("CS_RESULTS_PATH") {
            self.results_path = PathBuf::from(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.protocol.request_ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        if self.protocol.sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        self.game.validate()?;
        Ok(())
    }

    /// Serialize for a worker process.
    pub fn to_worker_env(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read the configuration the coordinator handed to this worker.
    pub fn from_worker_env() -> Result<Self, ConfigError> {
        let json = std::env::var(RUNTIME_CONFIG_ENV)
            .map_err(|_| ConfigError::MissingEnv(RUNTIME_CONFIG_ENV))?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
