//! The `WorkItem` envelope exchanged with remote workers.

use crate::job::JobId;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work dispatched to a worker and echoed back as a reply.
///
/// The same shape travels in both directions. Outbound, only `id`,
/// `created_at` and `payload` are populated. The worker fills in
/// `started_at`, `finished_at` and `result` before publishing the reply.
///
/// A reply carrying a `result` must also carry `finished_at`; an envelope
/// with neither represents a request still in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem<P, R> {
    /// Correlation key, assigned at creation, immutable.
    pub id: JobId,

    /// When the gateway built this item.
    pub created_at: DateTime<Utc>,

    /// When the worker picked the item up. Carried for diagnostics only;
    /// latency is measured from `created_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the worker finished processing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Domain input.
    pub payload: P,

    /// Domain output, present only on a resolved reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<R>,
}

impl<P, R> WorkItem<P, R> {
    /// Build a fresh outbound item with a new id and creation timestamp.
    pub fn new(payload: P) -> Self {
        Self {
            id: JobId::new(),
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            payload,
            result: None,
        }
    }

    /// Whether this envelope is a completed reply.
    pub fn is_resolved(&self) -> bool {
        self.result.is_some() && self.finished_at.is_some()
    }

    /// Elapsed time from creation to worker completion.
    ///
    /// Deliberately spans queueing and transit, not just worker compute
    /// time. `None` until the worker has stamped `finished_at`. The value
    /// can be negative if the worker's clock is behind the gateway's; the
    /// recorder drops such measurements.
    pub fn processing_time(&self) -> Option<TimeDelta> {
        self.finished_at.map(|finished| finished - self.created_at)
    }

    /// Worker-side helper: stamp the start of processing.
    pub fn mark_started(&mut self) {
        self.started_at = Some(Utc::now());
    }

    /// Worker-side helper: stamp completion and attach the result.
    pub fn complete(&mut self, result: R) {
        self.finished_at = Some(Utc::now());
        self.result = Some(result);
    }
}
