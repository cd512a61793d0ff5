//! Publisher and reply ports.
//!
//! These are the only surfaces the gateway sees of the broker. Implementors
//! must fail a publish immediately when the message cannot be routed; the
//! gateway relies on that to report dispatch failures without leaving a
//! pending entry behind.

use crate::message::WireMessage;
use async_trait::async_trait;

/// Broker-level errors.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// No consumer is attached to the target channel.
    #[error("no consumer attached to channel '{0}'")]
    NoConsumer(String),
    /// The underlying transport has shut down.
    #[error("bus closed")]
    Closed,
    /// Publish was rejected by the transport.
    #[error("publish failed: {0}")]
    PublishFailed(String),
}

/// Outbound side: send a work item toward a lane channel.
#[async_trait]
pub trait WorkPublisher: Send + Sync {
    /// Publish a message to its channel.
    ///
    /// Must return an error immediately when the broker is unreachable or
    /// the channel has no consumer; there is no buffering-and-retry at this
    /// layer.
    async fn publish(&self, message: WireMessage) -> Result<(), BusError>;
}

/// Inbound side: the stream of worker replies.
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Receive the next reply, blocking until one is available.
    ///
    /// Returns [`BusError::Closed`] once the transport is gone, which ends
    /// the listener loop.
    async fn recv(&self) -> Result<WireMessage, BusError>;
}
