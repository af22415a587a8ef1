//! `jira-digest report` command.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::{CatalogDefinition, ReportWindow};
use crate::cli::ReportArgs;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::AssembleError;
use crate::executor::QueryExecutor;
use crate::report::{Assembler, FailurePolicy, ReportDocument, ReportSection};
use crate::template::{TemplateError, TemplateSet};

/// Why a report could not be produced.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Configuration, template or catalog problems found before searching.
    #[error("{0}")]
    Setup(String),
    /// A section's search failed.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Fully resolved options for one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Catalog file.
    pub catalog: PathBuf,
    /// Template name.
    pub template: String,
    /// Where to copy the digest, if anywhere.
    pub scratch: Option<PathBuf>,
    /// Failure policy.
    pub policy: FailurePolicy,
}

impl ReportOptions {
    /// Merges command-line arguments over configuration defaults.
    #[must_use]
    pub fn resolve(config: &Config, args: &ReportArgs) -> Self {
        let scratch = if args.no_scratch {
            None
        } else {
            args.output.clone().or_else(|| config.report.scratch_file.clone())
        };
        Self {
            catalog: config.catalog_path(args.catalog.as_deref()),
            template: args.template.clone().unwrap_or_else(|| config.report.template.clone()),
            scratch,
            policy: if args.keep_going {
                FailurePolicy::KeepGoing
            } else {
                FailurePolicy::FailFast
            },
        }
    }
}

/// Execute the `report` command.
///
/// Prints the digest to stdout and copies it to the scratch file. A run that
/// fails still overwrites the scratch file: with whatever was assembled
/// before a fail-fast abort, or with nothing when setup fails, so the file
/// never holds a previous run's digest.
///
/// # Errors
///
/// Returns an error string if setup fails, a section fails, or the scratch
/// file cannot be written. Under `--keep-going` the digest is emitted first
/// and the error lists every failed section.
pub async fn run(ctx: &ServiceContext, config: &Config, args: &ReportArgs) -> Result<(), String> {
    let options = ReportOptions::resolve(config, args);

    let doc = match build(ctx, config, &options).await {
        Ok(doc) => doc,
        Err(err) => {
            if let Some(path) = &options.scratch {
                let partial = match &err {
                    ReportError::Assemble(AssembleError::Section { partial, .. }) => {
                        partial.as_str()
                    }
                    ReportError::Setup(_) => "",
                };
                match write_scratch(ctx, path, partial) {
                    Ok(()) => tracing::warn!(
                        path = %path.display(),
                        bytes = partial.len(),
                        "run failed, partial digest written"
                    ),
                    Err(e) => tracing::warn!(error = %e, "failed to reset scratch file"),
                }
            }
            return Err(err.to_string());
        }
    };

    print!("{}", doc.text());
    if let Some(path) = &options.scratch {
        write_scratch(ctx, path, doc.text())?;
    }

    if doc.is_complete() {
        return Ok(());
    }
    let failed: Vec<String> = doc
        .failures()
        .iter()
        .map(|f| format!("{} / {}: {}", f.team, f.category, f.error))
        .collect();
    Err(format!("{} section(s) failed:\n  {}", failed.len(), failed.join("\n  ")))
}

/// Builds the digest without writing it anywhere.
///
/// # Errors
///
/// Returns [`ReportError::Setup`] for template or catalog problems and
/// [`ReportError::Assemble`] when a fail-fast run aborts.
pub async fn build(
    ctx: &ServiceContext,
    config: &Config,
    options: &ReportOptions,
) -> Result<ReportDocument, ReportError> {
    let setup = |e: TemplateError| ReportError::Setup(e.to_string());
    let mut templates =
        TemplateSet::with_custom(&config.templates, ctx.fs.as_ref()).map_err(setup)?;
    let template = templates.resolve(&options.template, ctx.fs.as_ref()).map_err(setup)?;
    let sections = load_sections(ctx, &options.catalog).map_err(ReportError::Setup)?;
    tracing::info!(sections = sections.len(), template = template.name(), "assembling digest");

    let assembler = Assembler::new(QueryExecutor::new(ctx.tracker.as_ref()), template)
        .with_policy(options.policy);
    Ok(assembler.assemble(&sections).await?)
}

/// Reads the catalog at `path` and expands it against the context clock.
///
/// # Errors
///
/// Returns an error string if the catalog cannot be read, parsed or expanded.
pub fn load_sections(ctx: &ServiceContext, path: &Path) -> Result<Vec<ReportSection>, String> {
    let yaml = ctx
        .fs
        .read_to_string(path)
        .map_err(|e| format!("Failed to read catalog {}: {e}", path.display()))?;
    let definition = CatalogDefinition::parse(&yaml)
        .map_err(|e| format!("Failed to load catalog {}: {e}", path.display()))?;
    let window = ReportWindow::from_clock(ctx.clock.as_ref(), definition.window_days);
    tracing::debug!(since = %window.since, until = %window.until, "reporting window");
    definition
        .expand(&window)
        .map_err(|e| format!("Failed to expand catalog {}: {e}", path.display()))
}

fn write_scratch(ctx: &ServiceContext, path: &Path, text: &str) -> Result<(), String> {
    ctx.fs
        .write(path, text)
        .map_err(|e| format!("Failed to write digest to {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), "digest written");
    Ok(())
}
