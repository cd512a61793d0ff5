//! Work domain definitions.
//!
//! A [`WorkDomain`] ties together the payload and outcome types for one kind
//! of work plus its per-lane dispatch channel. The gateway is generic over
//! this trait, so adding a domain means adding one impl here rather than a
//! parallel set of controllers and message types.

use crate::job::Lane;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One kind of work the gateway can dispatch.
pub trait WorkDomain: Send + Sync + 'static {
    /// Domain name as used in logs and metric labels.
    const NAME: &'static str;

    /// Input carried to the worker.
    type Payload: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;

    /// Output carried back in the reply.
    type Outcome: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;

    /// Dispatch channel for the given lane.
    fn channel(lane: Lane) -> &'static str;

    /// Apply the caller's optional size limit to a resolved outcome.
    ///
    /// Default: limits do not apply to this domain.
    fn apply_limit(outcome: Self::Outcome, _limit: Option<usize>) -> Self::Outcome {
        outcome
    }
}

/// Payload for the event domain: a text transform multiplied `multiply`
/// times by the worker. The outcome is the worker's status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub text: String,
    pub multiply: u32,
}

/// The event work domain.
pub struct EventDomain;

impl WorkDomain for EventDomain {
    const NAME: &'static str = "event";

    type Payload = EventRequest;
    type Outcome = String;

    fn channel(lane: Lane) -> &'static str {
        match lane {
            Lane::Fast => "fast.event.rpc",
            Lane::Slow => "slow.event.rpc",
        }
    }
}

/// Payload for the permutation domain: the text whose permutations the
/// worker enumerates. The outcome is the list of permutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermutationRequest {
    pub text: String,
}

/// The permutation work domain.
pub struct PermutationDomain;

impl WorkDomain for PermutationDomain {
    const NAME: &'static str = "permutation";

    type Payload = PermutationRequest;
    type Outcome = Vec<String>;

    fn channel(lane: Lane) -> &'static str {
        match lane {
            Lane::Fast => "fast.permutation.rpc",
            Lane::Slow => "slow.permutation.rpc",
        }
    }

    /// Oversized results keep the first `limit - 1` elements.
    ///
    /// Long-standing caller-visible behavior: a result of 10 with a limit
    /// of 4 returns 3 elements. A limit of 0 saturates to an empty result.
    fn apply_limit(outcome: Self::Outcome, limit: Option<usize>) -> Self::Outcome {
        match limit {
            Some(limit) if outcome.len() > limit => {
                let mut truncated = outcome;
                truncated.truncate(limit.saturating_sub(1));
                truncated
            }
            _ => outcome,
        }
    }
}
