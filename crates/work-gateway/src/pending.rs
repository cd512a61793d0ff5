//! Pending-reply table.
//!
//! Maps job ids to waiting callers. Each entry holds a one-shot resolution
//! slot: exactly one of resolve, cancel, or the expiry sweep retires it,
//! and a retired id can never be resolved again. Entries for different ids
//! never contend with each other.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::JobId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A correlated reply as delivered by the listener: the id it matched and
/// the raw body for the waiting caller to interpret.
#[derive(Debug)]
pub struct ReplyEnvelope {
    /// Id the reply correlated on.
    pub id: JobId,
    /// Undecoded reply body.
    pub body: serde_json::Value,
}

/// A job id was registered twice. Ids are UUID v7, so this indicates the
/// same work item was dispatched twice rather than a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("job id {0} is already pending")]
pub struct DuplicateId(pub JobId);

/// A waiter pending resolution.
struct PendingEntry {
    /// Resolution slot, written at most once.
    sender: oneshot::Sender<ReplyEnvelope>,
    /// When the entry was registered.
    created_at: Instant,
    /// How long past `created_at` the sweep may reclaim it.
    deadline: Duration,
    /// Domain name (for logging).
    domain: &'static str,
}

/// Counters over the table's lifetime.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Entries registered.
    pub total_registered: AtomicU64,
    /// Entries retired by a matching reply.
    pub total_resolved: AtomicU64,
    /// Entries retired by the expiry sweep.
    pub total_swept: AtomicU64,
    /// Entries retired by the waiting side (its own timeout or drop).
    pub total_cancelled: AtomicU64,
    /// Replies discarded for want of a pending entry.
    pub total_stale: AtomicU64,
}

/// Thread-safe registry of in-flight requests awaiting correlated replies.
///
/// Flow:
/// 1. The dispatcher registers the item's id and keeps the receiver.
/// 2. The item goes out on the bus.
/// 3. The reply listener calls [`resolve`](Self::resolve) with the reply body.
/// 4. The waiting caller receives the body, or times out and cancels.
///
/// Size stays bounded by arrival rate times the longest deadline: the
/// waiting side cancels on its own timeout, and the background sweep
/// reclaims entries whose waiter disappeared without cancelling.
pub struct PendingReplyTable {
    pending: DashMap<JobId, PendingEntry>,
    stats: Arc<PendingStats>,
}

impl PendingReplyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending request under the caller-minted id.
    ///
    /// Returns the receiver the caller waits on, or [`DuplicateId`] if the
    /// id is already pending.
    pub fn register(
        &self,
        id: JobId,
        deadline: Duration,
        domain: &'static str,
    ) -> Result<oneshot::Receiver<ReplyEnvelope>, DuplicateId> {
        let (tx, rx) = oneshot::channel();
        let entry = PendingEntry {
            sender: tx,
            created_at: Instant::now(),
            deadline,
            domain,
        };

        match self.pending.entry(id) {
            Entry::Occupied(_) => Err(DuplicateId(id)),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
                debug!(job_id = %id, domain = domain, "Registered pending request");
                Ok(rx)
            }
        }
    }

    /// Deliver a reply body to the waiter registered under `id`.
    ///
    /// Returns `true` if a waiter was woken. A reply for an unknown id
    /// (already resolved, cancelled, or swept) is discarded: resolution is
    /// at most once, and late replies must never resurrect an entry.
    pub fn resolve(&self, id: JobId, body: serde_json::Value) -> bool {
        let Some((_, entry)) = self.pending.remove(&id) else {
            self.stats.total_stale.fetch_add(1, Ordering::Relaxed);
            warn!(job_id = %id, "Discarding reply with no pending entry");
            return false;
        };

        let waited = entry.created_at.elapsed();
        match entry.sender.send(ReplyEnvelope { id, body }) {
            Ok(()) => {
                self.stats.total_resolved.fetch_add(1, Ordering::Relaxed);
                debug!(
                    job_id = %id,
                    domain = entry.domain,
                    waited_ms = waited.as_millis() as u64,
                    "Resolved pending request"
                );
                true
            }
            Err(_) => {
                // Waiter abandoned the receiver before the reply landed.
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(job_id = %id, domain = entry.domain, "Waiter gone before resolution");
                false
            }
        }
    }

    /// Retire an entry from the waiting side (its own timeout fired).
    ///
    /// Returns `true` if the entry was still present.
    pub fn cancel(&self, id: JobId) -> bool {
        if self.pending.remove(&id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Remove entries whose deadline has passed without a reply.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, entry| {
            let elapsed = now.duration_since(entry.created_at);
            if elapsed > entry.deadline {
                warn!(
                    job_id = %id,
                    domain = entry.domain,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Sweeping expired pending request"
                );
                self.stats.total_swept.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    /// Number of currently pending entries.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether an id is still pending.
    pub fn is_pending(&self, id: &JobId) -> bool {
        self.pending.contains_key(id)
    }

    /// Lifetime counters.
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

impl Default for PendingReplyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Background sweep of expired entries.
pub async fn sweep_task(table: Arc<PendingReplyTable>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let removed = table.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Swept expired pending requests");
        }
    }
}
