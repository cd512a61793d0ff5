//! Lane dispatcher.
//!
//! Publishes work items to their lane channel. Registration with the
//! pending table happens before the publish, so a reply can never arrive
//! ahead of its entry; a failed publish rolls the registration back, so a
//! failed dispatch leaves no trace in the table.

use crate::error::DispatchError;
use crate::pending::{PendingReplyTable, ReplyEnvelope};
use shared_bus::{WireMessage, WorkPublisher};
use shared_types::{Lane, WorkDomain, WorkItem};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Publishes work items and hands back the receiver their reply will
/// resolve.
pub struct LaneDispatcher {
    publisher: Arc<dyn WorkPublisher>,
    pending: Arc<PendingReplyTable>,
}

impl LaneDispatcher {
    pub fn new(publisher: Arc<dyn WorkPublisher>, pending: Arc<PendingReplyTable>) -> Self {
        Self { publisher, pending }
    }

    /// Send `item` to its domain's channel on `lane`.
    ///
    /// `deadline` bounds how long the pending entry may outlive this call
    /// before the sweep reclaims it; the caller enforces its own wait
    /// separately.
    pub async fn dispatch<D: WorkDomain>(
        &self,
        lane: Lane,
        item: &WorkItem<D::Payload, D::Outcome>,
        deadline: Duration,
    ) -> Result<oneshot::Receiver<ReplyEnvelope>, DispatchError> {
        let message = WireMessage::encode::<D>(lane, item)?;
        let rx = self.pending.register(item.id, deadline, D::NAME)?;

        if let Err(e) = self.publisher.publish(message).await {
            self.pending.cancel(item.id);
            return Err(DispatchError::Bus(e));
        }

        debug!(
            job_id = %item.id,
            lane = lane.as_str(),
            domain = D::NAME,
            channel = D::channel(lane),
            "Dispatched work item"
        );

        Ok(rx)
    }
}
