//! Rolling percentile timer.
//!
//! Keeps a small ring of fixed-length time windows; opening a new window
//! discards the oldest, so percentile estimates cover only the most recent
//! `buffer_len * window` span. Each window holds at most
//! [`MAX_SAMPLES_PER_WINDOW`] samples, bounding memory under load.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::trace;

/// Cap on retained samples per window; excess measurements are dropped.
pub const MAX_SAMPLES_PER_WINDOW: usize = 4096;

struct Ring {
    /// Oldest window first, newest last. Never empty.
    windows: VecDeque<Vec<u64>>,
    /// When the newest window opened.
    opened_at: Instant,
}

/// Short-horizon percentile estimator over a ring of time windows.
pub struct RollingWindowTimer {
    window: Duration,
    buffer_len: usize,
    ring: Mutex<Ring>,
}

impl RollingWindowTimer {
    /// Create a timer retaining `buffer_len` windows of `window` length.
    ///
    /// A zero `buffer_len` is clamped to one window.
    #[must_use]
    pub fn new(window: Duration, buffer_len: usize) -> Self {
        let buffer_len = buffer_len.max(1);
        let mut windows = VecDeque::with_capacity(buffer_len);
        windows.push_back(Vec::new());
        Self {
            window,
            buffer_len,
            ring: Mutex::new(Ring {
                windows,
                opened_at: Instant::now(),
            }),
        }
    }

    /// Record one measurement into the current window.
    pub fn record(&self, elapsed_ms: u64) {
        let mut ring = self.ring.lock();
        self.rotate_locked(&mut ring);

        let current = ring.windows.back_mut().expect("ring is never empty");
        if current.len() < MAX_SAMPLES_PER_WINDOW {
            current.push(elapsed_ms);
        } else {
            trace!(elapsed_ms, "Window sample cap reached, measurement dropped");
        }
    }

    /// Estimate a quantile (0.0..=1.0) over all retained windows.
    ///
    /// Returns `None` when no samples are retained.
    pub fn quantile(&self, q: f64) -> Option<u64> {
        let mut ring = self.ring.lock();
        self.rotate_locked(&mut ring);

        let mut samples: Vec<u64> = ring.windows.iter().flatten().copied().collect();
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let q = q.clamp(0.0, 1.0);
        let rank = ((q * samples.len() as f64).ceil() as usize).max(1) - 1;
        Some(samples[rank.min(samples.len() - 1)])
    }

    /// 95th percentile over the retained windows.
    pub fn p95(&self) -> Option<u64> {
        self.quantile(0.95)
    }

    /// Samples currently retained across all windows.
    pub fn sample_count(&self) -> usize {
        let mut ring = self.ring.lock();
        self.rotate_locked(&mut ring);
        ring.windows.iter().map(Vec::len).sum()
    }

    /// Open new windows for however many window lengths have passed,
    /// discarding the oldest beyond the buffer.
    fn rotate_locked(&self, ring: &mut Ring) {
        let elapsed = ring.opened_at.elapsed();
        if elapsed < self.window {
            return;
        }

        let passed = (elapsed.as_nanos() / self.window.as_nanos().max(1)) as usize;
        if passed >= self.buffer_len {
            // Every retained window has aged out.
            ring.windows.clear();
            ring.windows.push_back(Vec::new());
            ring.opened_at = Instant::now();
        } else {
            for _ in 0..passed {
                if ring.windows.len() == self.buffer_len {
                    ring.windows.pop_front();
                }
                ring.windows.push_back(Vec::new());
            }
            ring.opened_at += self.window * passed as u32;
        }
    }
}
