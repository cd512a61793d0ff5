//! Structured logging setup.
//!
//! Log lines carry consistent fields (`timestamp`, `level`, `service`,
//! message plus call-site fields) so downstream aggregation can parse them
//! without custom rules. JSON output is switched on in containers or via
//! `LB_JSON_LOGS`.

use crate::config::LoggingConfig;
use crate::TelemetryError;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Safe to call once per process; a second call reports an error instead of
/// panicking (useful when tests race to initialize).
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    let result = if config.json_logs {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}
