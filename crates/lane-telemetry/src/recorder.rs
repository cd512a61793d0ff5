//! Per-lane latency recorder.
//!
//! One decaying histogram plus one rolling percentile timer per lane, with
//! prometheus counters for round-trip accounting. The registry is owned by
//! the recorder and handed to whoever exposes it; there is no global
//! metrics state.

use crate::config::RecorderConfig;
use crate::histogram::{DecayingHistogram, HistogramSnapshot};
use crate::rolling::RollingWindowTimer;
use crate::TelemetryError;
use chrono::TimeDelta;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use shared_types::Lane;
use std::collections::BTreeMap;
use tracing::warn;

/// Read-only summary of one lane's instruments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneSnapshot {
    /// Decaying-histogram view (current window).
    pub histogram: HistogramSnapshot,
    /// p95 over the rolling timer's retained windows.
    pub p95_ms: Option<u64>,
    /// Round trips recorded since process start (does not decay).
    pub recorded_total: u64,
}

struct LaneMetrics {
    histogram: DecayingHistogram,
    timer: RollingWindowTimer,
}

impl LaneMetrics {
    fn new(config: &RecorderConfig) -> Self {
        Self {
            histogram: DecayingHistogram::new(
                config.histogram_bounds_ms.clone(),
                config.statistics_expiry,
            ),
            timer: RollingWindowTimer::new(config.timer_window, config.timer_buffer_len),
        }
    }
}

/// Records completed round-trip latencies, one instrument pair per lane.
pub struct LatencyRecorder {
    fast: LaneMetrics,
    slow: LaneMetrics,
    registry: Registry,
    round_trips: IntCounterVec,
    dropped: IntCounter,
}

impl LatencyRecorder {
    /// Build a recorder and its private prometheus registry.
    pub fn new(config: &RecorderConfig) -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let round_trips = IntCounterVec::new(
            Opts::new(
                "lanebridge_round_trips_total",
                "Completed round trips with a recorded latency",
            ),
            &["lane"],
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        let dropped = IntCounter::new(
            "lanebridge_dropped_measurements_total",
            "Measurements rejected as malformed (negative elapsed time)",
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        registry
            .register(Box::new(round_trips.clone()))
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        registry
            .register(Box::new(dropped.clone()))
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        Ok(Self {
            fast: LaneMetrics::new(config),
            slow: LaneMetrics::new(config),
            registry,
            round_trips,
            dropped,
        })
    }

    fn lane_metrics(&self, lane: Lane) -> &LaneMetrics {
        match lane {
            Lane::Fast => &self.fast,
            Lane::Slow => &self.slow,
        }
    }

    /// Record one completed round trip.
    ///
    /// Never blocks and never fails. A negative elapsed time (worker clock
    /// behind the gateway's) is dropped with a warning instead of
    /// corrupting the instruments.
    pub fn record(&self, lane: Lane, elapsed: TimeDelta) {
        let millis = elapsed.num_milliseconds();
        if millis < 0 {
            warn!(
                lane = lane.as_str(),
                elapsed_ms = millis,
                "Dropping negative latency measurement"
            );
            self.dropped.inc();
            return;
        }

        let millis = millis as u64;
        let metrics = self.lane_metrics(lane);
        metrics.histogram.record(millis);
        metrics.timer.record(millis);
        self.round_trips.with_label_values(&[lane.as_str()]).inc();
    }

    /// Summarize one lane. Safe to call concurrently with `record`.
    pub fn snapshot(&self, lane: Lane) -> LaneSnapshot {
        let metrics = self.lane_metrics(lane);
        LaneSnapshot {
            histogram: metrics.histogram.snapshot(),
            p95_ms: metrics.timer.p95(),
            recorded_total: self.round_trips.with_label_values(&[lane.as_str()]).get(),
        }
    }

    /// Summaries for every lane, keyed by lane name.
    pub fn snapshot_all(&self) -> BTreeMap<&'static str, LaneSnapshot> {
        Lane::ALL
            .iter()
            .map(|lane| (lane.as_str(), self.snapshot(*lane)))
            .collect()
    }

    /// Measurements dropped as malformed.
    pub fn dropped_total(&self) -> u64 {
        self.dropped.get()
    }

    /// The recorder's registry, for mounting on an exposition endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode the recorder's counters in prometheus text format.
    pub fn encode_prometheus(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| TelemetryError::Encode(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Encode(e.to_string()))
    }
}
