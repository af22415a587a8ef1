//! Rendering templates: named Jinja templates mapping a search result to
//! text.
//!
//! Every template is rendered with two variables: `issues`, the list of
//! matching issues, and `query`, the filter that produced them. Each issue
//! exposes `key`, `summary`, `status`, `assignee`, `created`, `updated`,
//! `resolved` (dates as `YYYY-MM-DD`), `url` and `raw`, the tracker's own
//! JSON for the issue.
//!
//! Templates come from three places: the built-ins below, the `templates`
//! section of the config (inline source or a file), and a template file
//! path given directly where a template name is expected. All of them are
//! compiled when the [`TemplateSet`] is built, so syntax errors and unknown
//! top-level variables are reported before any search runs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use minijinja::{context, AutoEscape, Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::expand_home;
use crate::ports::{FileSystem, Issue};

/// Template used when neither the command line nor the config names one.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Variables every template is rendered with.
const CONTEXT_VARIABLES: &[&str] = &["issues", "query"];

/// Names the engine provides on its own.
const ENGINE_GLOBALS: &[&str] = &["range", "dict", "namespace", "debug", "loop"];

const BUILTIN: &[(&str, &str)] = &[
    (
        "default",
        "{% for issue in issues %}* [{{ issue.key }}]({{ issue.url }}) {{ issue.summary }}\n\
         {% endfor %}",
    ),
    ("keys", "{% for issue in issues %}* {{ issue.key }}\n{% endfor %}"),
    (
        "status",
        "{% for issue in issues %}* [{{ issue.key }}]({{ issue.url }}) {{ issue.summary }} \
         ({{ issue.status }}, {{ issue.assignee or \"Unassigned\" }})\n{% endfor %}",
    ),
    (
        "detailed",
        "{% for issue in issues %}* [{{ issue.key }}]({{ issue.url }}) {{ issue.summary }}\n    \
         * {{ issue.status }}, assigned to {{ issue.assignee or \"Unassigned\" }}, \
         updated {{ issue.updated or \"-\" }}\n{% endfor %}",
    ),
];

/// Errors raised while building, resolving or rendering templates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// No template with this name exists and no file has this path.
    #[error("unknown template '{name}' (available: {available})")]
    Unknown {
        /// Requested name.
        name: String,
        /// Comma-separated list of known names.
        available: String,
    },
    /// A template file could not be read.
    #[error("template '{template}': failed to read {}: {message}", path.display())]
    Read {
        /// Template name.
        template: String,
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O message.
        message: String,
    },
    /// The source is not valid template syntax.
    #[error("template '{template}' is malformed: {message}")]
    Syntax {
        /// Template name.
        template: String,
        /// Engine message, with line information.
        message: String,
    },
    /// The source refers to a variable templates are not given.
    #[error("template '{template}' uses unknown variable '{variable}' (known: issues, query)")]
    UnknownVariable {
        /// Template name.
        template: String,
        /// Offending variable.
        variable: String,
    },
    /// The source renders nothing.
    #[error("template '{template}' is empty")]
    Empty {
        /// Template name.
        template: String,
    },
    /// Rendering failed, typically on an attribute issues do not have.
    #[error("template '{template}' failed to render: {message}")]
    Render {
        /// Template name.
        template: String,
        /// Engine message.
        message: String,
    },
}

/// A template entry in the config file: inline source or a file to load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TemplateSource {
    /// Template source written directly in the config.
    Inline(String),
    /// Path of a template file.
    File {
        /// The file; `~` is expanded.
        file: PathBuf,
    },
}

/// Where a template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    /// Shipped with the binary.
    Builtin,
    /// Written inline in the config file.
    Config,
    /// Loaded from a file.
    File(PathBuf),
}

impl fmt::Display for TemplateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateOrigin::Builtin => f.write_str("built-in"),
            TemplateOrigin::Config => f.write_str("config"),
            TemplateOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The per-issue values a template sees.
#[derive(Serialize)]
struct IssueView<'a> {
    key: &'a str,
    summary: &'a str,
    status: &'a str,
    assignee: Option<&'a str>,
    created: Option<String>,
    updated: Option<String>,
    resolved: Option<String>,
    url: &'a str,
    raw: &'a serde_json::Value,
}

impl<'a> From<&'a Issue> for IssueView<'a> {
    fn from(issue: &'a Issue) -> Self {
        let date = |value: Option<chrono::DateTime<chrono::Utc>>| {
            value.map(|d| d.format("%Y-%m-%d").to_string())
        };
        Self {
            key: &issue.key,
            summary: &issue.summary,
            status: &issue.status,
            assignee: issue.assignee.as_deref(),
            created: date(issue.created),
            updated: date(issue.updated),
            resolved: date(issue.resolved),
            url: &issue.url,
            raw: &issue.raw,
        }
    }
}

/// A compiled, validated template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
    origin: TemplateOrigin,
    env: Environment<'static>,
}

impl Template {
    /// Compiles `source` into a template called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty, malformed, or refers to a
    /// variable other than `issues` and `query`.
    pub fn compile(
        name: &str,
        source: &str,
        origin: TemplateOrigin,
    ) -> Result<Self, TemplateError> {
        if source.trim().is_empty() {
            return Err(TemplateError::Empty { template: name.to_string() });
        }

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template_owned(name.to_string(), source.to_string()).map_err(|e| {
            TemplateError::Syntax { template: name.to_string(), message: e.to_string() }
        })?;

        let compiled = env.get_template(name).map_err(|e| TemplateError::Syntax {
            template: name.to_string(),
            message: e.to_string(),
        })?;
        let unknown = compiled
            .undeclared_variables(false)
            .into_iter()
            .filter(|v| !CONTEXT_VARIABLES.contains(&v.as_str()))
            .filter(|v| !ENGINE_GLOBALS.contains(&v.as_str()))
            .min();
        if let Some(variable) = unknown {
            return Err(TemplateError::UnknownVariable { template: name.to_string(), variable });
        }

        Ok(Self { name: name.to_string(), source: source.to_string(), origin, env })
    }

    /// Template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The uncompiled source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the template came from.
    #[must_use]
    pub fn origin(&self) -> &TemplateOrigin {
        &self.origin
    }

    /// Returns `true` for templates shipped with the binary.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.origin == TemplateOrigin::Builtin
    }

    /// Renders the search result for `query`.
    ///
    /// An empty issue list renders whatever the template emits outside its
    /// loop; the built-ins render the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] when the template touches a value
    /// that does not exist, such as an unknown issue attribute.
    pub fn render(&self, issues: &[Issue], query: &str) -> Result<String, TemplateError> {
        let issues: Vec<IssueView<'_>> = issues.iter().map(IssueView::from).collect();
        self.env
            .get_template(&self.name)
            .and_then(|t| t.render(context! { issues => issues, query => query }))
            .map_err(|e| TemplateError::Render {
                template: self.name.clone(),
                message: e.to_string(),
            })
    }
}

/// The enumerated set of templates available to a run.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: BTreeMap<String, Template>,
}

impl TemplateSet {
    /// Returns the built-in templates only.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = BUILTIN
            .iter()
            .filter_map(|(name, source)| {
                let template = Template::compile(name, source, TemplateOrigin::Builtin).ok()?;
                Some(((*name).to_string(), template))
            })
            .collect();
        Self { templates }
    }

    /// Returns the built-in templates extended with the config's templates.
    ///
    /// A config template with a built-in name replaces the built-in.
    ///
    /// # Errors
    ///
    /// Returns the first template that cannot be read or compiled.
    pub fn with_custom(
        custom: &BTreeMap<String, TemplateSource>,
        fs: &dyn FileSystem,
    ) -> Result<Self, TemplateError> {
        let mut set = Self::builtin();
        for (name, source) in custom {
            let template = match source {
                TemplateSource::Inline(text) => {
                    Template::compile(name, text, TemplateOrigin::Config)?
                }
                TemplateSource::File { file } => {
                    load_file(name, &expand_home(&file.to_string_lossy()), fs)?
                }
            };
            if set.templates.insert(name.clone(), template).is_some() {
                tracing::debug!(template = %name, "config template overrides built-in");
            }
        }
        Ok(set)
    }

    /// Looks up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Unknown`] listing the available names.
    pub fn get(&self, name: &str) -> Result<&Template, TemplateError> {
        self.templates.get(name).ok_or_else(|| TemplateError::Unknown {
            name: name.to_string(),
            available: self.templates.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    /// Looks up `name`, or loads it as a template file when no template has
    /// that name and the path exists.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Unknown`] when neither applies, or the
    /// file's read or compile error.
    pub fn resolve(&mut self, name: &str, fs: &dyn FileSystem) -> Result<&Template, TemplateError> {
        if !self.templates.contains_key(name) {
            let path = expand_home(name);
            if fs.exists(&path) {
                let template = load_file(name, &path, fs)?;
                self.templates.insert(name.to_string(), template);
            }
        }
        self.get(name)
    }

    /// Iterates templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }
}

fn load_file(name: &str, path: &Path, fs: &dyn FileSystem) -> Result<Template, TemplateError> {
    let source = fs.read_to_string(path).map_err(|e| TemplateError::Read {
        template: name.to_string(),
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::debug!(template = %name, path = %path.display(), "loaded template file");
    Template::compile(name, &source, TemplateOrigin::File(path.to_path_buf()))
}
