//! Error types shared across the digest pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::Category;
use crate::template::TemplateError;

/// Failure reported by the issue tracker for a single search.
///
/// Serializable so that recorded cassettes can replay failures with their
/// original kind.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum TrackerError {
    /// Missing or rejected credentials.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The tracker rejected the filter expression.
    #[error("query rejected: {0}")]
    Query(String),
    /// Transport failure, timeout, or an unreadable response.
    #[error("network error: {0}")]
    Network(String),
}

/// Failure of one search-and-render step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecuteError {
    /// The search failed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// The search succeeded but its template could not render the result.
    #[error(transparent)]
    Render(#[from] TemplateError),
}

/// Failure while assembling a report document.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// A section's search failed and the run was aborted.
    #[error("query for {team} / {category} failed: {source}")]
    Section {
        /// Team owning the failed section.
        team: String,
        /// Category of the failed section.
        category: Category,
        /// The search or render failure.
        source: ExecuteError,
        /// Everything assembled before the failure.
        partial: String,
    },
}
