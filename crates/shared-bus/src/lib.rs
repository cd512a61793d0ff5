//! # Shared Bus - Broker Boundary
//!
//! The gateway never talks to a broker client directly; it talks to the two
//! ports defined here. Production wiring binds them to a real broker
//! connection, tests and single-process setups bind them to
//! [`InMemoryBroker`].
//!
//! ```text
//! ┌──────────────┐  publish(WireMessage)   ┌──────────────┐
//! │   Gateway    │ ──────────────────────→ │    Broker    │
//! │              │                         │  (channels)  │
//! │              │ ←────────────────────── │              │
//! └──────────────┘   recv() replies        └──────────────┘
//!                                             ↑       │
//!                                     reply   │       │ work
//!                                             │       ▼
//!                                          ┌──────────────┐
//!                                          │    Worker    │
//!                                          └──────────────┘
//! ```
//!
//! Bodies travel as JSON values; the gateway owns encoding and decoding of
//! the [`shared_types::WorkItem`] envelope, so transports stay payload-blind.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod broker;
pub mod message;
pub mod ports;

// Re-export main types
pub use broker::InMemoryBroker;
pub use message::WireMessage;
pub use ports::{BusError, ReplySource, WorkPublisher};

/// Per-channel buffer before publishes start failing fast.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
