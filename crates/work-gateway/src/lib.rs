//! # Work Gateway
//!
//! Synchronous-looking submission over asynchronous broker-dispatched
//! workers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        WORK GATEWAY                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  submit(lane, payload, limit)                                │
//! │        │                                                     │
//! │  ┌─────┴────────────┐      ┌───────────────────────────┐     │
//! │  │  LaneDispatcher  │ ───→ │    PendingReplyTable      │     │
//! │  │ (encode+publish) │      │ (oneshot per job id)      │     │
//! │  └─────┬────────────┘      └──────────┬────────────────┘     │
//! │        │                              ↑ resolve(id, body)    │
//! │        ▼                              │                      │
//! │   WorkPublisher ──→ broker ──→ ReplySource ──→ ReplyListener │
//! │                                                              │
//! │  resolved reply ──→ LatencyRecorder.record(lane, elapsed)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per request the lifecycle is `created → dispatched → resolved | timed
//! out`, terminal either way; retries mean a fresh submission with a fresh
//! id. Waiters suspend independently: a slow reply for one job never holds
//! up another.
//!
//! # Usage
//!
//! ```ignore
//! let broker = Arc::new(InMemoryBroker::new());
//! let gateway = WorkGateway::new(GatewayConfig::default(), broker.clone(), broker)?;
//! gateway.spawn_background();
//!
//! let permutations = gateway
//!     .submit::<PermutationDomain>(Lane::Fast, PermutationRequest { text: "abc".into() }, None)
//!     .await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod pending;
pub mod service;

// Re-exports for public API
pub use config::{ConfigError, GatewayConfig, LaneConfig};
pub use dispatch::LaneDispatcher;
pub use error::{DispatchError, InitError, SubmitError};
pub use listener::ReplyListener;
pub use pending::{DuplicateId, PendingReplyTable, PendingStats, ReplyEnvelope};
pub use service::WorkGateway;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
