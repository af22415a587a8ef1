//! Runtime configuration, loaded once at startup and immutable afterwards.
//!
//! The file shares its layout with the other Jira helper scripts:
//!
//! ```yaml
//! server:
//!   url: https://issues.example.com
//!   auth:
//!     token_auth: <personal access token>
//! report:
//!   template: status
//! templates:
//!   mine: "{% for issue in issues %}* {{ issue.key }} [{{ issue.assignee }}]\n{% endfor %}"
//!   weekly:
//!     file: ~/templates/weekly.md.j2
//! ```

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::ports::FileSystem;
use crate::template::{TemplateSource, DEFAULT_TEMPLATE};

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "~/.jira_query.yaml";

/// Environment variable that overrides `server.auth.token_auth`.
pub const TOKEN_ENV: &str = "JIRA_DIGEST_TOKEN";

/// Scratch file the digest is copied to unless disabled.
pub const DEFAULT_SCRATCH_FILE: &str = "/tmp/jira-digest.md";

/// Issue fields requested by searches unless `server.fields` says otherwise.
pub const DEFAULT_SEARCH_FIELDS: &str = "summary,status,assignee,created,updated,resolutiondate";

/// Field selector asking the tracker for every field, custom ones included.
pub const ALL_FIELDS: &str = "*all";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {message}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O message.
        message: String,
    },
    /// The file is not valid YAML for this schema.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// `server.url` is not an absolute http(s) URL.
    #[error("server.url must be an absolute http(s) URL, got {0:?}")]
    InvalidUrl(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracker connection settings.
    pub server: ServerConfig,
    /// Report defaults.
    #[serde(default)]
    pub report: ReportConfig,
    /// User-defined templates, by name.
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateSource>,
    #[serde(skip)]
    origin: Option<PathBuf>,
}

/// Tracker connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the tracker.
    pub url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Issues requested per result page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Comma-separated issue fields requested by each search.
    #[serde(default = "default_fields")]
    pub fields: String,
    /// Credentials.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Credentials for the tracker.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Personal access token sent as a bearer token.
    #[serde(default)]
    pub token_auth: Option<String>,
}

/// Report defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Template used when none is given on the command line.
    #[serde(default = "default_template")]
    pub template: String,
    /// Catalog file; defaults to `catalog.yaml` next to the config file.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Copy of the digest written after each run; `null` disables it.
    #[serde(default = "default_scratch_file")]
    pub scratch_file: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            catalog: None,
            scratch_file: default_scratch_file(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_fields() -> String {
    DEFAULT_SEARCH_FIELDS.to_string()
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_scratch_file() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_SCRATCH_FILE))
}

impl Config {
    /// Parses configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not match the schema or the server
    /// URL is unusable.
    pub fn parse(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(yaml)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        let url = Url::parse(&config.server.url)
            .map_err(|_| ConfigError::InvalidUrl(config.server.url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(config.server.url));
        }
        config.origin = Some(path.to_path_buf());
        Ok(config)
    }

    /// Reads and parses the config file at `path` (`~` is expanded).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &str) -> Result<Self, ConfigError> {
        let path = expand_home(path);
        let yaml = fs
            .read_to_string(&path)
            .map_err(|e| ConfigError::Read { path: path.clone(), message: e.to_string() })?;
        Self::parse(&yaml, &path)
    }

    /// The API token: `JIRA_DIGEST_TOKEN` if set, else the config value.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        pick_token(env::var(TOKEN_ENV).ok(), self.server.auth.token_auth.as_ref())
    }

    /// Catalog path: `override_path`, else `report.catalog`, else
    /// `catalog.yaml` beside the config file.
    #[must_use]
    pub fn catalog_path(&self, override_path: Option<&Path>) -> PathBuf {
        if let Some(path) = override_path {
            return path.to_path_buf();
        }
        if let Some(path) = &self.report.catalog {
            return expand_home(&path.to_string_lossy());
        }
        self.origin
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from("catalog.yaml"), |dir| dir.join("catalog.yaml"))
    }
}

/// A non-blank environment token wins over the configured one.
fn pick_token(from_env: Option<String>, from_file: Option<&String>) -> Option<String> {
    from_env.filter(|t| !t.trim().is_empty()).or_else(|| from_file.cloned())
}

/// Expands a leading `~` to the user's home directory.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Serializes tests that touch `JIRA_DIGEST_TOKEN`.
    static TOKEN_ENV_LOCK: Mutex<()> = Mutex::new(());

    const MINIMAL: &str = "server:\n  url: https://issues.example.com\n";

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::parse(MINIMAL, Path::new("/etc/jira.yaml")).unwrap();
        assert_eq!(config.server.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.server.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.server.fields, DEFAULT_SEARCH_FIELDS);
        assert_eq!(config.report.template, DEFAULT_TEMPLATE);
        assert_eq!(config.report.scratch_file, Some(PathBuf::from(DEFAULT_SCRATCH_FILE)));
        assert!(config.templates.is_empty());
        assert!(config.server.auth.token_auth.is_none());
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
server:
  url: https://issues.example.com/jira
  timeout_secs: 5
  auth:
    token_auth: secret
report:
  template: status
  catalog: /srv/catalog.yaml
  scratch_file: null
templates:
  mine: "{% for issue in issues %}* {{ issue.key }}{% endfor %}"
  weekly:
    file: /srv/weekly.j2
"#;
        let config = Config::parse(yaml, Path::new("/etc/jira.yaml")).unwrap();
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.server.auth.token_auth.as_deref(), Some("secret"));
        assert_eq!(config.report.template, "status");
        assert_eq!(config.report.scratch_file, None);
        assert_eq!(
            config.templates["mine"],
            TemplateSource::Inline("{% for issue in issues %}* {{ issue.key }}{% endfor %}".into())
        );
        assert_eq!(
            config.templates["weekly"],
            TemplateSource::File { file: PathBuf::from("/srv/weekly.j2") }
        );
        assert_eq!(config.catalog_path(None), PathBuf::from("/srv/catalog.yaml"));
    }

    #[test]
    fn missing_server_is_a_parse_error() {
        let err = Config::parse("report: {}\n", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = Config::parse("server:\n  url: ftp://x\n", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
        let err = Config::parse("server:\n  url: issues\n", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn catalog_defaults_next_to_config() {
        let config = Config::parse(MINIMAL, Path::new("/home/me/.jira_query.yaml")).unwrap();
        assert_eq!(config.catalog_path(None), PathBuf::from("/home/me/catalog.yaml"));
        assert_eq!(
            config.catalog_path(Some(Path::new("other.yaml"))),
            PathBuf::from("other.yaml")
        );
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
    }

    #[test]
    fn expand_home_uses_platform_home_dir() {
        let Some(home) = dirs::home_dir() else { return };
        assert_eq!(expand_home("~/.jira_query.yaml"), home.join(".jira_query.yaml"));
        assert_eq!(expand_home("~"), home);
    }

    #[test]
    fn env_token_beats_file_token() {
        let file = "from-file".to_string();
        assert_eq!(pick_token(Some("from-env".into()), Some(&file)).as_deref(), Some("from-env"));
    }

    #[test]
    fn blank_env_token_falls_back_to_file() {
        let file = "from-file".to_string();
        assert_eq!(pick_token(Some("  ".into()), Some(&file)).as_deref(), Some("from-file"));
        assert_eq!(pick_token(None, Some(&file)).as_deref(), Some("from-file"));
    }

    #[test]
    fn no_token_anywhere_is_none() {
        assert_eq!(pick_token(None, None), None);
        assert_eq!(pick_token(Some(String::new()), None), None);
    }

    #[test]
    fn token_reads_environment_override() {
        let _guard = TOKEN_ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let yaml = "server:\n  url: https://issues.example.com\n  \
                    auth:\n    token_auth: from-file\n";
        let config = Config::parse(yaml, Path::new("/etc/jira.yaml")).unwrap();
        let saved = env::var_os(TOKEN_ENV);

        env::set_var(TOKEN_ENV, "from-env");
        let overridden = config.token();
        env::set_var(TOKEN_ENV, "");
        let blank = config.token();
        match saved {
            Some(value) => env::set_var(TOKEN_ENV, value),
            None => env::remove_var(TOKEN_ENV),
        }

        assert_eq!(overridden.as_deref(), Some("from-env"));
        assert_eq!(blank.as_deref(), Some("from-file"));
    }
}
