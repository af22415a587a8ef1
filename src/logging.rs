//! Logging via `tracing-subscriber`: a stderr layer whose level follows
//! `RUST_LOG` or `-v`/`-d`, and an optional debug-level file layer written
//! through `tracing-appender`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Log file written unless `--log-file` names another.
pub const DEFAULT_LOG_FILE: &str = "/tmp/jira-digest.log";

/// The file layer always records this crate at debug level.
const FILE_DIRECTIVE: &str = "jira_digest=debug,info";

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    /// Per-section progress (`-v`).
    Verbose,
    /// Every query and HTTP page (`-d`).
    Debug,
}

impl Verbosity {
    /// Picks the most verbose level requested.
    #[must_use]
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        match (verbose, debug) {
            (_, true) => Verbosity::Debug,
            (true, false) => Verbosity::Verbose,
            (false, false) => Verbosity::Quiet,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Verbose => "jira_digest=info,warn",
            Verbosity::Debug => "jira_digest=debug,info",
        }
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive did not parse.
    #[error("invalid log filter '{value}'")]
    EnvFilter {
        /// The rejected directive.
        value: String,
        /// Parser error.
        source: ParseError,
    },
    /// The log file could not be opened.
    #[error("cannot log to {}: {message}", path.display())]
    LogFile {
        /// Requested log file.
        path: PathBuf,
        /// Why it could not be opened.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("logging already initialised: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber.
///
/// When `log_file` is given, debug-level events are appended to it as well.
/// A log file that cannot be opened only disables the file layer, with a
/// warning on stderr. Keep the returned guard alive until exit so buffered
/// file output is flushed.
///
/// # Errors
///
/// Returns an error if a filter is invalid or a subscriber is already set.
pub fn init(
    verbosity: Verbosity,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(verbosity.directive())?,
    };
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    let mut file_error = None;
    let (file_layer, guard) = match log_file.map(open_log_file) {
        Some(Ok((writer, guard))) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(parse_filter(FILE_DIRECTIVE)?);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.into()))?;

    if let Some(e) = file_error {
        tracing::warn!(error = %e, "file logging disabled");
    }
    Ok(guard)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive)
        .map_err(|source| LoggingError::EnvFilter { value: directive.to_string(), source })
}

/// Opens `path` for appending behind a background writer thread.
fn open_log_file(path: &Path) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let log_file_error =
        |message: String| LoggingError::LogFile { path: path.to_path_buf(), message };
    let file_name = path
        .file_name()
        .ok_or_else(|| log_file_error("not a file path".into()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| log_file_error(e.to_string()))?;
    Ok(tracing_appender::non_blocking(appender))
}
