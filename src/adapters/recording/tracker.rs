//! Recording adapter for the `IssueTracker` port.

use std::sync::{Arc, Mutex};

use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{FilterSpec, IssueTracker, SearchFuture};

/// Records every search while delegating to an inner tracker.
///
/// Failures are recorded too, so a replay reproduces them.
pub struct RecordingTracker {
    inner: Box<dyn IssueTracker>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTracker {
    /// Wraps `inner`, appending each search to `recorder`.
    pub fn new(inner: Box<dyn IssueTracker>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl IssueTracker for RecordingTracker {
    fn search<'a>(&'a self, filter: &'a FilterSpec) -> SearchFuture<'a> {
        Box::pin(async move {
            let result = self.inner.search(filter).await;
            match self.recorder.lock() {
                Ok(mut recorder) => recorder.record(filter.as_str(), &result),
                Err(_) => {
                    tracing::warn!(%filter, "cassette recorder poisoned; search not recorded");
                }
            }
            result
        })
    }
}
