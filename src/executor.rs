//! Query executor: one tracker search rendered through one template.

use crate::error::{ExecuteError, TrackerError};
use crate::ports::{FilterSpec, Issue, IssueTracker};
use crate::template::Template;

/// Thin typed wrapper over an [`IssueTracker`].
///
/// Templates are resolved from a validated
/// [`TemplateSet`](crate::template::TemplateSet) before they reach the
/// executor, so only search and render failures surface here.
pub struct QueryExecutor<'a> {
    tracker: &'a dyn IssueTracker,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor over the given tracker.
    #[must_use]
    pub fn new(tracker: &'a dyn IssueTracker) -> Self {
        Self { tracker }
    }

    /// Runs one search and returns the matching issues.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Query`] for a blank filter without contacting
    /// the tracker; otherwise propagates the tracker's error unchanged.
    pub async fn fetch(&self, filter: &FilterSpec) -> Result<Vec<Issue>, TrackerError> {
        if filter.is_blank() {
            return Err(TrackerError::Query("filter is empty".into()));
        }
        tracing::debug!(%filter, "searching issues");
        let issues = self.tracker.search(filter).await?;
        tracing::debug!(count = issues.len(), "search returned");
        Ok(issues)
    }

    /// Runs one search and renders the result with `template`, which sees
    /// the filter as its `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::Tracker`] for the failures of
    /// [`QueryExecutor::fetch`] and [`ExecuteError::Render`] when the
    /// template fails on the result.
    pub async fn execute(
        &self,
        filter: &FilterSpec,
        template: &Template,
    ) -> Result<String, ExecuteError> {
        let issues = self.fetch(filter).await?;
        Ok(template.render(&issues, filter.as_str())?)
    }
}
