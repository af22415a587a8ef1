//! Report domain: sections, categories and the assembled document.

pub mod assemble;
pub mod postprocess;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ports::FilterSpec;

pub use assemble::{Assembler, FailurePolicy, ReportDocument, SectionFailure};

/// Status-window classification of a report section.
///
/// Variants are declared in report order; the derived `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Issues resolved inside the reporting window.
    Finished,
    /// Issues waiting for review.
    InReview,
    /// Issues being worked on.
    InProgress,
    /// Issues opened inside the reporting window.
    New,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 4] =
        [Category::Finished, Category::InReview, Category::InProgress, Category::New];

    /// Human-readable label used in headings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Finished => "Finished",
            Category::InReview => "In Review",
            Category::InProgress => "In Progress",
            Category::New => "New",
        }
    }

    /// The bullet heading that introduces this category's block.
    #[must_use]
    pub fn heading(self) -> String {
        format!("* {} issues", self.label())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (team, category, filter) unit of the report catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    /// Team heading this section is grouped under.
    pub team: String,
    /// Category heading of this section.
    pub category: Category,
    /// Search that fills the section.
    pub filter: FilterSpec,
}

impl ReportSection {
    /// Creates a section.
    pub fn new(team: impl Into<String>, category: Category, filter: FilterSpec) -> Self {
        Self { team: team.into(), category, filter }
    }
}
