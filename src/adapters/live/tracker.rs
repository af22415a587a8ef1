//! Live adapter for the `IssueTracker` port using the Jira REST v2 search API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::error::TrackerError;
use crate::ports::{FilterSpec, Issue, IssueTracker, SearchFuture};

const SEARCH_PATH: &str = "rest/api/2/search";

/// Jira search client authenticated with a personal access token.
pub struct JiraTracker {
    client: Client,
    base_url: Url,
    token: Option<String>,
    page_size: u32,
    fields: String,
}

impl JiraTracker {
    /// Creates a client for the configured server.
    ///
    /// A missing token is not an error here; searches fail with
    /// [`TrackerError::Auth`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(server: &ServerConfig, token: Option<String>) -> Result<Self, String> {
        // Url::join replaces the last path segment unless the base ends in '/'.
        let mut base = server.url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|e| format!("Invalid server URL {}: {e}", server.url))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(server.timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url,
            token,
            page_size: server.page_size.max(1),
            fields: server.fields.clone(),
        })
    }

    async fn fetch_page(
        &self,
        token: &str,
        filter: &FilterSpec,
        start_at: usize,
    ) -> Result<SearchPage, TrackerError> {
        let url = self
            .base_url
            .join(SEARCH_PATH)
            .map_err(|e| TrackerError::Network(format!("invalid search URL: {e}")))?;

        let start_at = start_at.to_string();
        let max_results = self.page_size.to_string();
        tracing::debug!(%start_at, "requesting search page");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("jql", filter.as_str()),
                ("startAt", start_at.as_str()),
                ("maxResults", max_results.as_str()),
                ("fields", self.fields.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TrackerError::Network(format!("search timed out: {e}"))
                } else {
                    TrackerError::Network(format!("search request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TrackerError::Network(format!("failed to read search response: {e}")))?;

        match status {
            s if s.is_success() => serde_json::from_str(&body).map_err(|e| {
                TrackerError::Network(format!("failed to parse search response: {e}"))
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(TrackerError::Auth(format!("tracker answered {status}")))
            }
            StatusCode::BAD_REQUEST => Err(TrackerError::Query(error_message(&body))),
            _ => Err(TrackerError::Network(format!(
                "unexpected status {status}: {}",
                error_message(&body)
            ))),
        }
    }
}

impl IssueTracker for JiraTracker {
    fn search<'a>(&'a self, filter: &'a FilterSpec) -> SearchFuture<'a> {
        Box::pin(async move {
            let token = self
                .token
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| TrackerError::Auth("no API token configured".into()))?;

            let mut issues = Vec::new();
            loop {
                let page = self.fetch_page(token, filter, issues.len()).await?;
                let fetched = page.issues.len();
                for raw in page.issues {
                    issues.push(into_issue(raw, &self.base_url)?);
                }
                if fetched == 0 || issues.len() >= page.total {
                    break;
                }
            }
            Ok(issues)
        })
    }
}

/// One page of the search response. Issues stay untyped until each is
/// normalized, so their full JSON can be kept.
#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<serde_json::Value>,
}

/// An issue as returned by the search API.
#[derive(Deserialize)]
struct RawIssue {
    key: String,
    fields: RawFields,
}

#[derive(Deserialize)]
struct RawFields {
    #[serde(default)]
    summary: String,
    status: Option<Named>,
    assignee: Option<Person>,
    created: Option<String>,
    updated: Option<String>,
    resolutiondate: Option<String>,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct Person {
    #[serde(rename = "displayName")]
    display_name: String,
}

/// Error body returned with 4xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default, rename = "errorMessages")]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: std::collections::BTreeMap<String, String>,
}

/// Normalizes one search hit, keeping its JSON as [`Issue::raw`].
fn into_issue(raw: serde_json::Value, base_url: &Url) -> Result<Issue, TrackerError> {
    let parsed: RawIssue = serde_json::from_value(raw.clone())
        .map_err(|e| TrackerError::Network(format!("failed to parse issue: {e}")))?;
    let url = base_url
        .join(&format!("browse/{}", parsed.key))
        .map_or_else(|_| format!("{base_url}browse/{}", parsed.key), String::from);
    let fields = parsed.fields;
    Ok(Issue {
        url,
        key: parsed.key,
        summary: fields.summary,
        status: fields.status.map(|s| s.name).unwrap_or_default(),
        assignee: fields.assignee.map(|p| p.display_name),
        created: fields.created.as_deref().and_then(parse_timestamp),
        updated: fields.updated.as_deref().and_then(parse_timestamp),
        resolved: fields.resolutiondate.as_deref().and_then(parse_timestamp),
        raw,
    })
}

/// Jira timestamps look like `2024-06-14T09:12:44.000+0000`.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error_messages.is_empty() || !parsed.errors.is_empty() => parsed
            .error_messages
            .into_iter()
            .chain(parsed.errors.into_iter().map(|(field, msg)| format!("{field}: {msg}")))
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}
