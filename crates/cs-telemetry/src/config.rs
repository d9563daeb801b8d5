//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name, the prefix of [`full_service_name`](Self::full_service_name)
    pub service_name: String,

    /// Process role (`coordinator` or `worker`)
    pub role: String,

    /// Worker number, for worker processes
    pub worker_id: Option<u32>,

    /// Filter directive (trace, debug, info, warn, error, or per-target)
    pub log_level: String,

    /// Whether to emit JSON lines
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "collective-sarsa".to_string(),
            role: "coordinator".to_string(),
            worker_id: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// - `CS_SERVICE_NAME`: Service name (default: collective-sarsa)
    /// - `CS_LOG_LEVEL` or `RUST_LOG`: Filter (default: info)
    /// - `CS_JSON_LOGS`: `true`/`1` for JSON output (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: env::var("CS_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: env::var("CS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: env::var("CS_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.json_logs),

            ..defaults
        }
    }

    /// Configuration for a process role, read from the environment.
    pub fn for_role(role: &str, worker_id: Option<u32>) -> Self {
        let mut config = Self::from_env();
        config.role = role.to_string();
        config.worker_id = worker_id;
        config
    }

    /// Process name logged once by [`init_logging`](crate::init_logging),
    /// e.g. `collective-sarsa-worker-3`.
    pub fn full_service_name(&self) -> String {
        match self.worker_id {
            Some(id) => format!("{}-{}-{}", self.service_name, self.role, id),
            None => format!("{}-{}", self.service_name, self.role),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
