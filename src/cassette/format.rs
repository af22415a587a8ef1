//! Cassette data structures for recording and replaying searches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::ports::Issue;

/// What a recorded search produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The search succeeded with these issues.
    Issues(Vec<Issue>),
    /// The search failed.
    Error(TrackerError),
}

/// A single recorded search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Filter text sent to the tracker.
    pub filter: String,
    /// Result of the search.
    pub outcome: Outcome,
}

/// A cassette containing a sequence of recorded searches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cassette {
    /// Tracker base URL at recording time.
    pub server: String,
    /// Clock reading when recording started; replay uses it as "now" so
    /// that date windows expand identically.
    pub recorded_at: DateTime<Utc>,
    /// Ordered list of searches.
    pub interactions: Vec<Interaction>,
}
