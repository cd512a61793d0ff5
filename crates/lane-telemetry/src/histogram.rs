//! Decaying latency histogram.
//!
//! Counts accumulate into fixed buckets and the whole window resets lazily
//! once the configured expiry has elapsed since the window opened. Writers
//! touch one atomic per record; the rotation stamp is behind a read-write
//! lock that is only write-locked at rotation time.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// One bucket of a histogram snapshot. `le_ms == None` is the overflow
/// bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub le_ms: Option<u64>,
    pub count: u64,
}

/// Read-only view of a histogram window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    /// Measurements in the current window.
    pub count: u64,
    /// Sum of measurements in milliseconds.
    pub sum_ms: u64,
    /// Mean in milliseconds, 0.0 when empty.
    pub mean_ms: f64,
    /// Largest measurement in the current window.
    pub max_ms: u64,
    /// Cumulative-style bucket counts.
    pub buckets: Vec<BucketCount>,
}

/// Latency distribution whose counts age out after an expiry window.
pub struct DecayingHistogram {
    /// Bucket upper bounds in milliseconds, ascending.
    bounds_ms: Vec<u64>,

    /// One counter per bound plus the overflow bucket.
    counts: Vec<AtomicU64>,

    count: AtomicU64,
    sum_ms: AtomicU64,
    max_ms: AtomicU64,

    /// Window length; elapsing it since `opened_at` triggers a reset.
    expiry: Duration,

    /// When the current window opened.
    opened_at: RwLock<Instant>,
}

impl DecayingHistogram {
    /// Create a histogram with the given bucket bounds and expiry window.
    #[must_use]
    pub fn new(bounds_ms: Vec<u64>, expiry: Duration) -> Self {
        let counts = (0..=bounds_ms.len()).map(|_| AtomicU64::new(0)).collect();
        Self {
            bounds_ms,
            counts,
            count: AtomicU64::new(0),
            sum_ms: AtomicU64::new(0),
            max_ms: AtomicU64::new(0),
            expiry,
            opened_at: RwLock::new(Instant::now()),
        }
    }

    /// Record one measurement.
    pub fn record(&self, elapsed_ms: u64) {
        self.maybe_decay();

        let idx = self.bounds_ms.partition_point(|&bound| bound < elapsed_ms);
        self.counts[idx].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_ms.fetch_add(elapsed_ms, Ordering::Relaxed);
        self.max_ms.fetch_max(elapsed_ms, Ordering::Relaxed);
    }

    /// Read the current window. Concurrent writers are not blocked; the
    /// view is eventually consistent.
    pub fn snapshot(&self) -> HistogramSnapshot {
        self.maybe_decay();

        let count = self.count.load(Ordering::Relaxed);
        let sum_ms = self.sum_ms.load(Ordering::Relaxed);
        let buckets = self
            .bounds_ms
            .iter()
            .map(Some)
            .chain(std::iter::once(None))
            .zip(self.counts.iter())
            .map(|(bound, counter)| BucketCount {
                le_ms: bound.copied(),
                count: counter.load(Ordering::Relaxed),
            })
            .collect();

        HistogramSnapshot {
            count,
            sum_ms,
            mean_ms: if count == 0 {
                0.0
            } else {
                sum_ms as f64 / count as f64
            },
            max_ms: self.max_ms.load(Ordering::Relaxed),
            buckets,
        }
    }

    /// Reset the window if it has outlived its expiry.
    fn maybe_decay(&self) {
        {
            let opened = self.opened_at.read();
            if opened.elapsed() < self.expiry {
                return;
            }
        }

        let mut opened = self.opened_at.write();
        // Another writer may have rotated while we waited for the lock.
        if opened.elapsed() < self.expiry {
            return;
        }

        for counter in &self.counts {
            counter.store(0, Ordering::Relaxed);
        }
        self.count.store(0, Ordering::Relaxed);
        self.sum_ms.store(0, Ordering::Relaxed);
        self.max_ms.store(0, Ordering::Relaxed);
        *opened = Instant::now();
    }
}
