//! Core library entry for the `jira-digest` CLI.
//!
//! A digest is a catalog of (team, category, filter) sections. Each filter is
//! searched on the tracker, rendered through a template, and nested under
//! its team and category headings.

pub mod adapters;
pub mod cassette;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod logging;
pub mod placeholders;
pub mod ports;
pub mod report;
pub mod template;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    dotenvy::dotenv().ok();

    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };

    let verbosity = logging::Verbosity::from_flags(cli.verbose, cli.debug);
    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    let _log_guard = match logging::init(verbosity, log_file) {
        Ok(guard) => guard,
        Err(e) => {
            // Only reachable when a caller already installed a subscriber.
            tracing::debug!(error = %e, "keeping existing subscriber");
            None
        }
    };

    commands::dispatch(&cli)
}
