//! Replaying adapter for the `IssueTracker` port.

use std::sync::Mutex;

use crate::cassette::format::Outcome;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::TrackerError;
use crate::ports::{FilterSpec, IssueTracker, SearchFuture};

/// Serves recorded search results from a cassette.
pub struct ReplayingTracker {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTracker {
    /// Creates a replaying tracker backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn next(&self, filter: &FilterSpec) -> Result<Outcome, TrackerError> {
        let mut replayer = self
            .replayer
            .lock()
            .map_err(|_| TrackerError::Network("cassette replayer poisoned".into()))?;
        replayer
            .next_interaction(filter.as_str())
            .map(|interaction| interaction.outcome)
            .map_err(TrackerError::Network)
    }
}

impl IssueTracker for ReplayingTracker {
    fn search<'a>(&'a self, filter: &'a FilterSpec) -> SearchFuture<'a> {
        let result = self.next(filter).and_then(|outcome| match outcome {
            Outcome::Issues(issues) => Ok(issues),
            Outcome::Error(err) => Err(err),
        });
        Box::pin(async move { result })
    }
}
