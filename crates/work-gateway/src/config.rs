//! Gateway configuration with validation.

use lane_telemetry::RecorderConfig;
use serde::{Deserialize, Serialize};
use shared_types::Lane;
use std::time::Duration;

/// Main gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Fast-lane settings.
    pub fast: LaneConfig,
    /// Slow-lane settings.
    pub slow: LaneConfig,
    /// How often the pending table is swept for expired entries.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    /// Latency instrument settings shared by both lanes.
    pub recorder: RecorderConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            fast: LaneConfig::default(),
            slow: LaneConfig::default(),
            sweep_interval: Duration::from_secs(10),
            recorder: RecorderConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for lane in Lane::ALL {
            if self.lane(lane).reply_wait.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!(
                    "{} lane reply_wait cannot be 0",
                    lane
                )));
            }
        }

        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "sweep_interval cannot be 0".into(),
            ));
        }

        if self.recorder.timer_buffer_len == 0 {
            return Err(ConfigError::InvalidLimit(
                "timer_buffer_len cannot be 0".into(),
            ));
        }

        if self.recorder.statistics_expiry.is_zero() || self.recorder.timer_window.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "instrument windows cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Settings for one lane.
    pub fn lane(&self, lane: Lane) -> &LaneConfig {
        match lane {
            Lane::Fast => &self.fast,
            Lane::Slow => &self.slow,
        }
    }

    /// The reply-wait ceiling for one lane.
    pub fn reply_wait(&self, lane: Lane) -> Duration {
        self.lane(lane).reply_wait
    }
}

/// Per-lane settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// How long a caller waits for a correlated reply before the request is
    /// reported unavailable.
    #[serde(with = "humantime_serde")]
    pub reply_wait: Duration,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            reply_wait: Duration::from_secs(120),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

/// Humantime serde module for Duration serialization.
mod humantime_serde {
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
