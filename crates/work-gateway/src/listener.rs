//! Reply listener.
//!
//! Drains the broker's reply stream and resolves the pending table. The
//! listener only reads the id out of each body; interpreting the rest is
//! the waiting caller's job.

use crate::pending::PendingReplyTable;
use serde::Deserialize;
use shared_bus::{BusError, ReplySource};
use shared_types::JobId;
use std::sync::Arc;
use tracing::{error, warn};

/// The one field every reply must carry.
#[derive(Debug, Deserialize)]
struct ReplyHead {
    id: JobId,
}

/// Pumps replies from the bus into the pending table.
pub struct ReplyListener {
    pending: Arc<PendingReplyTable>,
    source: Arc<dyn ReplySource>,
}

impl ReplyListener {
    pub fn new(pending: Arc<PendingReplyTable>, source: Arc<dyn ReplySource>) -> Self {
        Self { pending, source }
    }

    /// Run until the reply stream closes.
    pub async fn run(self) {
        loop {
            match self.source.recv().await {
                Ok(message) => self.handle_reply(message.body),
                Err(BusError::Closed) => {
                    warn!("Reply stream closed, stopping listener");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error receiving reply");
                }
            }
        }
    }

    fn handle_reply(&self, body: serde_json::Value) {
        let head: ReplyHead = match serde_json::from_value(body.clone()) {
            Ok(head) => head,
            Err(e) => {
                warn!(error = %e, "Discarding reply without a readable id");
                return;
            }
        };

        // Stale and duplicate replies are counted and logged by the table.
        self.pending.resolve(head.id, body);
    }
}
