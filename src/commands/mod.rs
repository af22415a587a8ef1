//! Command dispatch and handlers.

pub mod catalog;
pub mod query;
pub mod report;
pub mod templates;

#[cfg(test)]
mod test_support;

use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::adapters::live::LiveFileSystem;
use crate::cli::{Cli, Command, ReportArgs};
use crate::config::{Config, ALL_FIELDS};
use crate::context::ServiceContext;

/// Environment variable naming a cassette file to record searches into.
pub const RECORD_ENV: &str = "JIRA_DIGEST_RECORD";

/// Dispatch a parsed command line to its handler.
///
/// `--replay` serves searches from a cassette. Otherwise, when
/// `JIRA_DIGEST_RECORD` is set, searches made by `report` and `query` are
/// recorded to that file.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let default_report = ReportArgs::default();
    match &cli.command {
        Some(Command::Templates) => templates::run(&cli.config),
        Some(Command::Catalog { catalog }) => {
            let config = load_config(&cli.config)?;
            let ctx = open_context(&config, cli.replay.as_deref(), false)?;
            catalog::run(&ctx, &config, catalog.as_deref())
        }
        Some(Command::Query(args)) => {
            let mut config = load_config(&cli.config)?;
            if args.dump.is_some() {
                // Dumps carry the issue as the tracker has it, custom fields included.
                config.server.fields = ALL_FIELDS.to_string();
            }
            let ctx = open_context(&config, cli.replay.as_deref(), true)?;
            block_on(query::run(&ctx, &config, args))?
        }
        Some(Command::Report(args)) => run_report(cli, args),
        None => run_report(cli, &default_report),
    }
}

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<(), String> {
    let config = load_config(&cli.config)?;
    let ctx = open_context(&config, cli.replay.as_deref(), true)?;
    block_on(report::run(&ctx, &config, args))?
}

fn load_config(path: &str) -> Result<Config, String> {
    Config::load(&LiveFileSystem, path).map_err(|e| e.to_string())
}

/// Builds the service context for this run.
fn open_context(
    config: &Config,
    replay: Option<&Path>,
    allow_recording: bool,
) -> Result<ServiceContext, String> {
    if let Some(path) = replay {
        return ServiceContext::replaying(path);
    }
    match env::var(RECORD_ENV) {
        Ok(path) if allow_recording && !path.is_empty() => {
            tracing::info!(cassette = %path, "recording searches");
            ServiceContext::recording(config, PathBuf::from(path))
        }
        _ => ServiceContext::live(config),
    }
}

/// Drives `future` to completion on a current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

/// Left-aligned text table in the style of the other listing commands.
fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| rows.iter().map(|r| r[i].len()).max().unwrap_or(0).max(h.len()))
        .collect();

    let mut out = String::new();
    let mut push_row = |cells: Vec<String>| {
        let last = cells.len() - 1;
        for (i, cell) in cells.iter().enumerate() {
            if i == last {
                out.push_str(cell);
            } else {
                out.push_str(&format!("{cell:<width$}  ", width = widths[i]));
            }
        }
        out.push('\n');
    };

    push_row(headers.iter().map(ToString::to_string).collect());
    push_row(widths.iter().map(|w| "-".repeat(*w)).collect());
    for row in rows {
        push_row(row.clone());
    }
    out
}
