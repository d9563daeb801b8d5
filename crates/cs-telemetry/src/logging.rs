//! Subscriber installation and logging helpers.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: env filter plus a fmt layer on stderr.
///
/// Fails if the filter directive does not parse or a global subscriber is
/// already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Filter {
        directive: config.log_level.clone(),
        reason: e.to_string(),
    })?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    };
    installed.map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::debug!(
        service = %config.full_service_name(),
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Log a peer-related event with standard fields.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $subsystem:expr, $msg:expr, $worker_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            worker_id = %$worker_id,
            $($($field)*,)?
            $msg
        )
    };
}
