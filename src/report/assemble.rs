//! Report assembly: one search per catalog section, nested under team and
//! category headings.

use crate::error::{AssembleError, ExecuteError};
use crate::executor::QueryExecutor;
use crate::report::postprocess::{indent_bullets, strip_blank_lines, NEST_INDENT};
use crate::report::{Category, ReportSection};
use crate::template::Template;

/// What to do when a section's search fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort on the first failure; later sections are never fetched.
    #[default]
    FailFast,
    /// Render a failure line in place of the section body and continue.
    KeepGoing,
}

/// A section whose search failed under [`FailurePolicy::KeepGoing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    /// Team owning the section.
    pub team: String,
    /// Category of the section.
    pub category: Category,
    /// The search or render failure.
    pub error: ExecuteError,
}

/// The assembled digest text plus any sections that failed along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    text: String,
    failures: Vec<SectionFailure>,
}

impl ReportDocument {
    /// The document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sections rendered as failures.
    #[must_use]
    pub fn failures(&self) -> &[SectionFailure] {
        &self.failures
    }

    /// Returns `true` when every section was fetched successfully.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the [`QueryExecutor`] over a catalog and stitches the results
/// into a [`ReportDocument`].
pub struct Assembler<'a> {
    executor: QueryExecutor<'a>,
    template: &'a Template,
    policy: FailurePolicy,
}

impl<'a> Assembler<'a> {
    /// Creates a fail-fast assembler rendering every section with `template`.
    #[must_use]
    pub fn new(executor: QueryExecutor<'a>, template: &'a Template) -> Self {
        Self { executor, template, policy: FailurePolicy::default() }
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Assembles the catalog in order.
    ///
    /// A team heading is emitted once per run of consecutive sections with
    /// the same team. Each section contributes its category heading, the
    /// rendered block with blank lines removed and bullets nested, and a
    /// trailing blank line.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::FailFast`], returns [`AssembleError::Section`]
    /// for the first failing section, carrying the text of every section
    /// completed before it.
    pub async fn assemble(
        &self,
        catalog: &[ReportSection],
    ) -> Result<ReportDocument, AssembleError> {
        let mut doc = ReportDocument::default();
        let mut current_team: Option<&str> = None;

        for section in catalog {
            let mut block = String::new();
            if current_team != Some(section.team.as_str()) {
                block.push_str(&format!("# {}\n", section.team));
            }
            block.push_str(&section.category.heading());
            block.push('\n');

            tracing::info!(
                team = %section.team,
                category = %section.category,
                "fetching section"
            );
            match self.executor.execute(&section.filter, self.template).await {
                Ok(rendered) => block.push_str(&indent_bullets(&strip_blank_lines(&rendered))),
                Err(error) if self.policy == FailurePolicy::KeepGoing => {
                    tracing::warn!(
                        team = %section.team,
                        category = %section.category,
                        %error,
                        "section failed, continuing"
                    );
                    block.push_str(&format!("{NEST_INDENT}* query failed: {error}\n"));
                    doc.failures.push(SectionFailure {
                        team: section.team.clone(),
                        category: section.category,
                        error,
                    });
                }
                Err(source) => {
                    return Err(AssembleError::Section {
                        team: section.team.clone(),
                        category: section.category,
                        source,
                        partial: doc.text,
                    });
                }
            }
            block.push('\n');

            doc.text.push_str(&block);
            current_team = Some(section.team.as_str());
        }

        Ok(doc)
    }
}
