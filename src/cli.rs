//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::logging::DEFAULT_LOG_FILE;

/// Top-level CLI parser for `jira-digest`.
#[derive(Debug, Parser)]
#[command(
    name = "jira-digest",
    version,
    about = "Render weekly status digests from Jira searches"
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Serve searches from a recorded cassette instead of the tracker.
    #[arg(long, global = true, value_name = "CASSETTE")]
    pub replay: Option<PathBuf>,

    /// Enable info level logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug level logging output.
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// File that receives a debug-level log of every run.
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Do not write the log file.
    #[arg(long, global = true, conflicts_with = "log_file")]
    pub no_log_file: bool,

    /// The command to execute; `report` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assemble the weekly digest from the catalog.
    Report(ReportArgs),
    /// Run one ad-hoc search and render it.
    Query(QueryArgs),
    /// List the available templates.
    Templates,
    /// Print the expanded catalog filters without searching.
    Catalog {
        /// Catalog file (defaults to the configured one).
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

/// Options for `report`.
#[derive(Debug, Default, Args)]
pub struct ReportArgs {
    /// Catalog file (defaults to the configured one).
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Template to render every section with.
    #[arg(long)]
    pub template: Option<String>,

    /// Write the digest copy here instead of the configured scratch file.
    #[arg(long, value_name = "FILE", conflicts_with = "no_scratch")]
    pub output: Option<PathBuf>,

    /// Do not write a scratch copy of the digest.
    #[arg(long)]
    pub no_scratch: bool,

    /// Render failed sections inline and keep going instead of aborting.
    #[arg(long)]
    pub keep_going: bool,
}

/// Options for `query`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Jira Query Language (JQL) string.
    pub query: String,

    /// Template to render the result with.
    #[arg(long)]
    pub template: Option<String>,

    /// Also dump each issue as JSON into this directory.
    #[arg(
        long,
        value_name = "DIR",
        num_args = 0..=1,
        default_missing_value = "jira_issue_details"
    )]
    pub dump: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn no_subcommand_means_report() {
        let cli = Cli::parse_from(["jira-digest"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, "~/.jira_query.yaml");
        assert_eq!(cli.log_file, std::path::PathBuf::from("/tmp/jira-digest.log"));
        assert!(!cli.no_log_file);
    }

    #[test]
    fn parses_report_flags() {
        let cli = Cli::parse_from(["jira-digest", "report", "--keep-going", "--template", "keys"]);
        let Some(Command::Report(args)) = cli.command else {
            panic!("expected report");
        };
        assert!(args.keep_going);
        assert_eq!(args.template.as_deref(), Some("keys"));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["jira-digest", "templates", "-d", "--config", "/tmp/c.yaml"]);
        assert!(cli.debug);
        assert_eq!(cli.config, "/tmp/c.yaml");
        assert!(matches!(cli.command, Some(Command::Templates)));
    }

    #[test]
    fn dump_without_value_uses_default_directory() {
        let cli = Cli::parse_from(["jira-digest", "query", "project = X", "--dump"]);
        let Some(Command::Query(args)) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.dump.as_deref(), Some(std::path::Path::new("jira_issue_details")));
    }

    #[test]
    fn output_conflicts_with_no_scratch() {
        let result =
            Cli::try_parse_from(["jira-digest", "report", "--output", "x.md", "--no-scratch"]);
        assert!(result.is_err());
    }
}
