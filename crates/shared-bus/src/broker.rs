//! In-memory broker.
//!
//! Routes each channel to one attached consumer over a bounded mpsc queue
//! and funnels all replies through a single shared channel. Suitable for
//! tests and single-process composition; distributed deployments bind the
//! ports to a real broker client instead.

use crate::message::WireMessage;
use crate::ports::{BusError, ReplySource, WorkPublisher};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

/// In-memory implementation of both broker ports.
///
/// Publishes fail fast: no consumer attached, consumer gone, or a full
/// queue all surface as an immediate error rather than buffering.
pub struct InMemoryBroker {
    /// Channel name to the attached consumer's queue.
    routes: DashMap<String, mpsc::Sender<WireMessage>>,

    /// Worker-side handle for publishing replies.
    reply_tx: mpsc::Sender<WireMessage>,

    /// Gateway-side end of the reply channel.
    reply_rx: Mutex<mpsc::Receiver<WireMessage>>,

    /// Total messages accepted for dispatch.
    published: AtomicU64,

    /// Queue capacity used for worker channels.
    capacity: usize,
}

impl InMemoryBroker {
    /// Create a broker with default queue capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a broker with the given per-channel queue capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel(capacity);
        Self {
            routes: DashMap::new(),
            reply_tx,
            reply_rx: Mutex::new(reply_rx),
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Attach a consumer to a channel, returning its work queue.
    ///
    /// Re-attaching replaces the previous consumer; its queue closes once
    /// drained.
    pub fn attach_worker(&self, channel: &str) -> mpsc::Receiver<WireMessage> {
        let (tx, rx) = mpsc::channel(self.capacity);
        if self.routes.insert(channel.to_string(), tx).is_some() {
            warn!(channel = channel, "Replaced existing consumer on channel");
        }
        debug!(channel = channel, "Consumer attached");
        rx
    }

    /// Handle workers use to publish replies.
    pub fn reply_sender(&self) -> mpsc::Sender<WireMessage> {
        self.reply_tx.clone()
    }

    /// Total messages accepted for dispatch.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Number of channels with an attached consumer.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkPublisher for InMemoryBroker {
    async fn publish(&self, message: WireMessage) -> Result<(), BusError> {
        let Some(route) = self.routes.get(&message.channel) else {
            return Err(BusError::NoConsumer(message.channel));
        };

        match route.try_send(message) {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(msg)) => {
                warn!(channel = %msg.channel, "Channel queue full, rejecting publish");
                Err(BusError::PublishFailed(format!(
                    "channel '{}' queue full",
                    msg.channel
                )))
            }
            Err(mpsc::error::TrySendError::Closed(msg)) => {
                // Consumer dropped its queue; treat as unattached.
                drop(route);
                self.routes.remove(&msg.channel);
                Err(BusError::NoConsumer(msg.channel))
            }
        }
    }
}

#[async_trait]
impl ReplySource for InMemoryBroker {
    async fn recv(&self) -> Result<WireMessage, BusError> {
        let mut guard = self.reply_rx.lock().await;
        guard.recv().await.ok_or(BusError::Closed)
    }
}
