//! Gateway error taxonomy.
//!
//! Everything broker- or correlation-level is absorbed here and surfaces to
//! the upstream caller as one of two outcomes besides success: the dispatch
//! failed outright, or no usable reply arrived in time. Stale and malformed
//! replies never cross this boundary.

use crate::config::ConfigError;
use crate::pending::DuplicateId;
use lane_telemetry::TelemetryError;
use shared_bus::BusError;
use shared_types::Lane;
use std::time::Duration;

/// Failure to construct the gateway.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// Configuration rejected by validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Latency instruments could not be built.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Failure to get a work item onto the bus.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The broker rejected the publish; no pending entry was left behind.
    #[error("dispatch failed: {0}")]
    Bus(#[from] BusError),

    /// The work item could not be encoded for the wire.
    #[error("failed to encode work item: {0}")]
    Encode(#[from] serde_json::Error),

    /// A job id collided in the pending table. Ids are UUID v7; this
    /// signals a programming error (an item published twice), not bad luck.
    #[error(transparent)]
    Duplicate(#[from] DuplicateId),
}

/// Caller-visible failure of a submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The item never reached the bus.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// No usable reply within the wait ceiling: timed out, swept, or the
    /// reply was missing its result or completion timestamp.
    #[error("{lane} lane unavailable: no reply within {}s", waited.as_secs())]
    Unavailable {
        /// Lane the work was submitted on.
        lane: Lane,
        /// How long the caller waited.
        waited: Duration,
    },
}
