//! # Shared Types Crate
//!
//! Cross-crate vocabulary for the gateway: job identifiers, priority lanes,
//! the `WorkItem` envelope exchanged with remote workers, and the
//! [`WorkDomain`] definitions for the two supported work kinds.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary
//!   lives here.
//! - **One envelope**: `WorkItem<P, R>` is the sole record shape sent to and
//!   received from workers; domains differ only in payload and outcome types.
//! - **Correlation by id only**: replies are matched on `JobId`, never on
//!   arrival order or channel.

pub mod domain;
pub mod envelope;
pub mod job;

pub use domain::{EventDomain, EventRequest, PermutationDomain, PermutationRequest, WorkDomain};
pub use envelope::WorkItem;
pub use job::{JobId, Lane, LaneParseError};
