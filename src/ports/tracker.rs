//! Issue tracker port for searching work items.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Boxed future type alias used by [`IssueTracker`] to keep the trait dyn-compatible.
pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Issue>, TrackerError>> + Send + 'a>>;

/// A tracker-specific search predicate (JQL for Jira).
///
/// Opaque to this crate: it is never parsed locally, only checked for
/// emptiness before a search is issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(String);

impl FilterSpec {
    /// Wraps a predicate string.
    pub fn new(predicate: impl Into<String>) -> Self {
        Self(predicate.into())
    }

    /// Returns the predicate text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the predicate is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An issue returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker key, e.g. `KONFLUX-1234`.
    pub key: String,
    /// One-line summary.
    pub summary: String,
    /// Workflow status name.
    pub status: String,
    /// Display name of the assignee, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Resolution time, for resolved issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<DateTime<Utc>>,
    /// Browser link to the issue.
    pub url: String,
    /// The issue exactly as the tracker returned it, custom fields included.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

/// Searches an external issue tracker.
///
/// Abstracting the tracker allows deterministic replay and testing without
/// touching a real tracker API.
pub trait IssueTracker: Send + Sync {
    /// Returns every issue matching `filter`, in the tracker's order.
    ///
    /// A single call may span several result pages; it still counts as one
    /// search. No caching or retries happen at this boundary.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Auth`], [`TrackerError::Query`] or
    /// [`TrackerError::Network`] as reported by the tracker.
    fn search<'a>(&'a self, filter: &'a FilterSpec) -> SearchFuture<'a>;
}
