//! Report catalog: which searches fill which sections.
//!
//! The catalog is a YAML list of teams. Each team yields one section per
//! [`Category`], in category order, using either the built-in filter for
//! that category or a per-team override:
//!
//! ```yaml
//! window_days: 7
//! teams:
//!   - name: Perf&Scale
//!     project: KONFLUX
//!     component: Performance
//!     filters:
//!       in_review: '{scope} AND status = "Code Review"'
//! ```
//!
//! Filters may reference `{team}`, `{project}`, `{component}`, `{scope}`,
//! `{since}` and `{until}`. `{scope}` is the project clause, narrowed to the
//! component when the team has one.

pub mod window;

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::placeholders::{self, Piece, PlaceholderError};
use crate::ports::FilterSpec;
use crate::report::{Category, ReportSection};

pub use window::{ReportWindow, DEFAULT_WINDOW_DAYS};

/// Errors raised while loading or expanding a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file is not valid YAML for this schema.
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A team entry has a blank name.
    #[error("team #{index} has an empty name")]
    EmptyTeamName {
        /// Zero-based position in the catalog.
        index: usize,
    },
    /// A filter is not valid placeholder syntax.
    #[error("filter for {team} / {category} is malformed: {source}")]
    Syntax {
        /// Team owning the filter.
        team: String,
        /// Category of the filter.
        category: Category,
        /// Underlying syntax error.
        source: PlaceholderError,
    },
    /// A filter references a placeholder that does not exist.
    #[error("filter for {team} / {category} references unknown placeholder '{name}'")]
    UnknownPlaceholder {
        /// Team owning the filter.
        team: String,
        /// Category of the filter.
        category: Category,
        /// Offending placeholder.
        name: String,
    },
    /// A filter uses `{component}` but the team has none.
    #[error("filter for {team} / {category} uses {{component}} but the team has no component")]
    MissingComponent {
        /// Team owning the filter.
        team: String,
        /// Category of the filter.
        category: Category,
    },
    /// A filter expands to nothing.
    #[error("filter for {team} / {category} is empty")]
    EmptyFilter {
        /// Team owning the filter.
        team: String,
        /// Category of the filter.
        category: Category,
    },
}

/// One team in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamEntry {
    /// Heading text for the team.
    pub name: String,
    /// Tracker project key.
    pub project: String,
    /// Optional component narrowing the team's scope.
    #[serde(default)]
    pub component: Option<String>,
    /// Per-category filter overrides.
    #[serde(default)]
    pub filters: BTreeMap<Category, String>,
}

/// The parsed catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogDefinition {
    /// Length of the reporting window in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Teams, in report order.
    #[serde(default)]
    pub teams: Vec<TeamEntry>,
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

/// Built-in filter for a category.
#[must_use]
pub fn default_filter(category: Category) -> &'static str {
    match category {
        Category::Finished => {
            r#"{scope} AND status in (Done, Closed) AND resolved >= "{since}" ORDER BY key"#
        }
        Category::InReview => "{scope} AND status = Review ORDER BY key",
        Category::InProgress => r#"{scope} AND status = "In Progress" ORDER BY key"#,
        Category::New => {
            r#"{scope} AND status in (New, "To Do") AND created >= "{since}" ORDER BY key"#
        }
    }
}

impl CatalogDefinition {
    /// Parses a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not match the catalog schema or a
    /// team has no name.
    pub fn parse(yaml: &str) -> Result<Self, CatalogError> {
        let definition: Self = serde_yaml::from_str(yaml)?;
        if let Some(index) = definition.teams.iter().position(|t| t.name.trim().is_empty()) {
            return Err(CatalogError::EmptyTeamName { index });
        }
        Ok(definition)
    }

    /// Expands every team into its four sections with placeholders filled
    /// in from `window`.
    ///
    /// # Errors
    ///
    /// Returns the first filter that cannot be expanded.
    pub fn expand(&self, window: &ReportWindow) -> Result<Vec<ReportSection>, CatalogError> {
        let mut sections = Vec::with_capacity(self.teams.len() * Category::ALL.len());
        for team in &self.teams {
            for category in Category::ALL {
                let source = team
                    .filters
                    .get(&category)
                    .map_or_else(|| default_filter(category), String::as_str);
                let filter = expand_filter(team, category, source, window)?;
                sections.push(ReportSection::new(&team.name, category, filter));
            }
        }
        Ok(sections)
    }
}

fn expand_filter(
    team: &TeamEntry,
    category: Category,
    source: &str,
    window: &ReportWindow,
) -> Result<FilterSpec, CatalogError> {
    let pieces = placeholders::parse(source).map_err(|source| CatalogError::Syntax {
        team: team.name.clone(),
        category,
        source,
    })?;

    let mut out = String::with_capacity(source.len());
    for piece in pieces {
        match piece {
            Piece::Text(text) => out.push_str(&text),
            Piece::Name("team") => out.push_str(&team.name),
            Piece::Name("project") => out.push_str(&team.project),
            Piece::Name("component") => out.push_str(team.component.as_deref().ok_or_else(
                || CatalogError::MissingComponent { team: team.name.clone(), category },
            )?),
            Piece::Name("scope") => out.push_str(&scope(team)),
            Piece::Name("since") => out.push_str(&window.since.format("%Y-%m-%d").to_string()),
            Piece::Name("until") => out.push_str(&window.until.format("%Y-%m-%d").to_string()),
            Piece::Name(name) => {
                return Err(CatalogError::UnknownPlaceholder {
                    team: team.name.clone(),
                    category,
                    name: name.to_string(),
                })
            }
        }
    }

    let filter = FilterSpec::new(out);
    if filter.is_blank() {
        return Err(CatalogError::EmptyFilter { team: team.name.clone(), category });
    }
    Ok(filter)
}

fn scope(team: &TeamEntry) -> String {
    match &team.component {
        Some(component) => {
            format!(r#"project = "{}" AND component = "{component}""#, team.project)
        }
        None => format!(r#"project = "{}""#, team.project),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> ReportWindow {
        ReportWindow::ending(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), 7)
    }

    const CATALOG: &str = r#"
teams:
  - name: Perf&Scale
    project: KONFLUX
    component: Performance
    filters:
      in_review: '{scope} AND status = "Code Review"'
  - name: Docs
    project: DOCS
"#;

    #[test]
    fn parses_with_default_window() {
        let definition = CatalogDefinition::parse(CATALOG).unwrap();
        assert_eq!(definition.window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(definition.teams.len(), 2);
        assert_eq!(definition.teams[1].component, None);
    }

    #[test]
    fn expands_teams_times_categories_in_order() {
        let sections = CatalogDefinition::parse(CATALOG).unwrap().expand(&window()).unwrap();

        assert_eq!(sections.len(), 8);
        let order: Vec<(&str, Category)> =
            sections.iter().map(|s| (s.team.as_str(), s.category)).collect();
        assert_eq!(&order[..4], &[
            ("Perf&Scale", Category::Finished),
            ("Perf&Scale", Category::InReview),
            ("Perf&Scale", Category::InProgress),
            ("Perf&Scale", Category::New),
        ]);
        assert_eq!(order[4], ("Docs", Category::Finished));
    }

    #[test]
    fn default_filters_use_scope_and_window() {
        let sections = CatalogDefinition::parse(CATALOG).unwrap().expand(&window()).unwrap();

        assert_eq!(
            sections[0].filter.as_str(),
            concat!(
                r#"project = "KONFLUX" AND component = "Performance" "#,
                r#"AND status in (Done, Closed) AND resolved >= "2024-06-08" ORDER BY key"#
            )
        );
        assert_eq!(
            sections[4].filter.as_str(),
            concat!(
                r#"project = "DOCS" AND status in (Done, Closed) "#,
                r#"AND resolved >= "2024-06-08" ORDER BY key"#
            )
        );
    }

    #[test]
    fn overrides_replace_default_filter() {
        let sections = CatalogDefinition::parse(CATALOG).unwrap().expand(&window()).unwrap();
        assert_eq!(
            sections[1].filter.as_str(),
            r#"project = "KONFLUX" AND component = "Performance" AND status = "Code Review""#
        );
    }

    #[test]
    fn component_placeholder_requires_component() {
        let yaml = r"
teams:
  - name: Docs
    project: DOCS
    filters:
      new: 'component = {component}'
";
        let err = CatalogDefinition::parse(yaml).unwrap().expand(&window()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingComponent { category: Category::New, .. }));
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let yaml = r"
teams:
  - name: Docs
    project: DOCS
    filters:
      finished: 'sprint = {sprint}'
";
        let err = CatalogDefinition::parse(yaml).unwrap().expand(&window()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "filter for Docs / Finished references unknown placeholder 'sprint'"
        );
    }

    #[test]
    fn blank_override_is_rejected() {
        let yaml = "teams:\n  - name: Docs\n    project: DOCS\n    filters:\n      new: '  '\n";
        let err = CatalogDefinition::parse(yaml).unwrap().expand(&window()).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyFilter { .. }));
    }

    #[test]
    fn blank_team_name_is_rejected() {
        let yaml = "teams:\n  - name: ''\n    project: X\n";
        assert!(matches!(
            CatalogDefinition::parse(yaml),
            Err(CatalogError::EmptyTeamName { index: 0 })
        ));
    }

    #[test]
    fn empty_catalog_expands_to_nothing() {
        let definition = CatalogDefinition::parse("teams: []").unwrap();
        assert!(definition.expand(&window()).unwrap().is_empty());
    }

    #[test]
    fn unknown_category_key_is_a_parse_error() {
        let yaml = "teams:\n  - name: A\n    project: A\n    filters:\n      blocked: x\n";
        assert!(matches!(CatalogDefinition::parse(yaml), Err(CatalogError::Parse(_))));
    }
}
