//! The unit a broker transports.

use serde::{Deserialize, Serialize};
use shared_types::{Lane, WorkDomain, WorkItem};

/// A routed, JSON-bodied message.
///
/// The body is the serialized [`WorkItem`] envelope; transports never look
/// inside it. Channel names come from the work domain's lane mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// Dispatch channel (e.g. `fast.permutation.rpc`).
    pub channel: String,
    /// Opaque JSON body.
    pub body: serde_json::Value,
}

impl WireMessage {
    /// Encode a work item for its domain's channel on the given lane.
    pub fn encode<D: WorkDomain>(
        lane: Lane,
        item: &WorkItem<D::Payload, D::Outcome>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            channel: D::channel(lane).to_string(),
            body: serde_json::to_value(item)?,
        })
    }

    /// Decode the body back into a typed work item.
    pub fn decode<D: WorkDomain>(
        &self,
    ) -> Result<WorkItem<D::Payload, D::Outcome>, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}
