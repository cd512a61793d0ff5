//! Instrument and logging configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Settings shared by every lane's instrument pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// How long accumulated histogram counts stay before the whole window
    /// resets.
    #[serde(with = "humantime_serde")]
    pub statistics_expiry: Duration,

    /// Length of one rolling-timer window.
    #[serde(with = "humantime_serde")]
    pub timer_window: Duration,

    /// How many rolling-timer windows are retained.
    pub timer_buffer_len: usize,

    /// Histogram bucket upper bounds in milliseconds, ascending. An
    /// overflow bucket is added implicitly.
    pub histogram_bounds_ms: Vec<u64>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            statistics_expiry: Duration::from_secs(60),
            timer_window: Duration::from_secs(20),
            timer_buffer_len: 3,
            // 100ms steps up to 1.9s
            histogram_bounds_ms: (1..20).map(|step| step * 100).collect(),
        }
    }
}

/// Logging configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Service name stamped on log lines.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    /// Whether to emit JSON formatted logs.
    pub json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service_name: "lanebridge".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl LoggingConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LB_SERVICE_NAME`: Service name (default: lanebridge)
    /// - `LB_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LB_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("LB_SERVICE_NAME").unwrap_or_else(|_| "lanebridge".to_string()),

            log_level: env::var("LB_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("LB_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
}

/// Humantime serde module for Duration fields.
pub(crate) mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
