//! `jira-digest query` command.

use std::path::Path;

use crate::cli::QueryArgs;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::executor::QueryExecutor;
use crate::ports::{FilterSpec, Issue};
use crate::template::TemplateSet;

/// Execute the `query` command.
///
/// # Errors
///
/// Returns an error string if the template is unknown or the search fails.
pub async fn run(ctx: &ServiceContext, config: &Config, args: &QueryArgs) -> Result<(), String> {
    let text = execute(ctx, config, args).await?;
    print!("{text}");
    Ok(())
}

/// Runs the search and renders it, dumping issues when asked.
///
/// # Errors
///
/// Returns an error string if the template is unknown or the search fails.
/// Dump failures are logged and do not fail the command.
pub async fn execute(
    ctx: &ServiceContext,
    config: &Config,
    args: &QueryArgs,
) -> Result<String, String> {
    let mut templates = TemplateSet::with_custom(&config.templates, ctx.fs.as_ref())
        .map_err(|e| e.to_string())?;
    let name = args.template.as_deref().unwrap_or(&config.report.template);
    let template = templates.resolve(name, ctx.fs.as_ref()).map_err(|e| e.to_string())?;

    let filter = FilterSpec::new(&args.query);
    let executor = QueryExecutor::new(ctx.tracker.as_ref());
    let issues = executor.fetch(&filter).await.map_err(|e| e.to_string())?;
    tracing::info!(count = issues.len(), "query returned");

    if let Some(dir) = &args.dump {
        dump_issues(ctx, dir, &issues);
    }
    template.render(&issues, filter.as_str()).map_err(|e| e.to_string())
}

/// Writes each issue as `issue-<KEY>.json` under `dir`.
///
/// The tracker's own JSON is written when the search kept it, so custom
/// fields survive; otherwise the normalized issue is.
fn dump_issues(ctx: &ServiceContext, dir: &Path, issues: &[Issue]) {
    for issue in issues {
        let path = dir.join(format!("issue-{}.json", issue.key));
        let json = if issue.raw.is_null() {
            serde_json::to_string_pretty(issue)
        } else {
            serde_json::to_string_pretty(&issue.raw)
        };
        let written = json
            .map_err(|e| e.to_string())
            .and_then(|json| ctx.fs.write(&path, &json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => tracing::debug!(path = %path.display(), "issue dumped"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to dump issue"),
        }
    }
}
