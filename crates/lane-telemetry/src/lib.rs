//! # Lane Telemetry
//!
//! Latency instruments for the dispatch lanes.
//!
//! ## Components
//!
//! - **Decaying histogram**: long-horizon latency distribution whose counts
//!   age out after a configured expiry window, so a stale spike cannot skew
//!   the picture forever.
//! - **Rolling percentile timer**: short-horizon p95 over a small ring of
//!   fixed-length time windows.
//! - **Recorder**: one instrument pair per lane, prometheus round-trip
//!   counters, and read-only snapshots for the diagnostics surface.
//!
//! Recording never blocks and never fails; malformed measurements are
//! dropped with a warning. Snapshots may run concurrently with writers and
//! read an eventually-consistent view.

mod config;
mod histogram;
mod logging;
mod recorder;
mod rolling;

pub use config::{LoggingConfig, RecorderConfig};
pub use histogram::{BucketCount, DecayingHistogram, HistogramSnapshot};
pub use logging::init_logging;
pub use recorder::{LaneSnapshot, LatencyRecorder};
pub use rolling::RollingWindowTimer;

use thiserror::Error;

/// Telemetry initialization and exposition errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("failed to register metrics: {0}")]
    MetricsInit(String),

    #[error("failed to encode metrics: {0}")]
    Encode(String),
}
