//! Job identity and priority lanes.
//!
//! Uses UUID v7 for time-ordered, unique identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Correlation key linking an outbound work item to its eventual reply.
///
/// Uses UUID v7 which is time-ordered, making it ideal for:
/// - Log correlation
/// - Request/reply matching
/// - Rough creation-time ordering when scanning tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a new job id (UUID v7).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for JobId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<JobId> for Uuid {
    fn from(id: JobId) -> Self {
        id.0
    }
}

/// A named priority class with its own dispatch channel and telemetry
/// instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    /// Low-latency lane backed by the fast worker pool.
    Fast,
    /// Bulk lane backed by the slow worker pool.
    Slow,
}

impl Lane {
    /// Both lanes, in a fixed order (useful for per-lane instrument setup).
    pub const ALL: [Lane; 2] = [Lane::Fast, Lane::Slow];

    /// Lane name as it appears in channel names and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Fast => "fast",
            Lane::Slow => "slow",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from parsing a lane name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lane: {0}")]
pub struct LaneParseError(pub String);

impl FromStr for Lane {
    type Err = LaneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Lane::Fast),
            "slow" => Ok(Lane::Slow),
            other => Err(LaneParseError(other.to_string())),
        }
    }
}
