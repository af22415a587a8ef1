//! `jira-digest templates` command.

use crate::adapters::live::LiveFileSystem;
use crate::commands::format_table;
use crate::config::{expand_home, Config};
use crate::ports::FileSystem;
use crate::template::TemplateSet;

/// Execute the `templates` command.
///
/// Works without a config file; only the built-in templates are listed then.
///
/// # Errors
///
/// Returns an error string if the config exists but is invalid, or a user
/// template cannot be read or compiled.
pub fn run(config_path: &str) -> Result<(), String> {
    print!("{}", list(&LiveFileSystem, config_path)?);
    Ok(())
}

fn list(fs: &dyn FileSystem, config_path: &str) -> Result<String, String> {
    let path = expand_home(config_path);
    let set = if fs.exists(&path) {
        let config = Config::load(fs, config_path).map_err(|e| e.to_string())?;
        TemplateSet::with_custom(&config.templates, fs).map_err(|e| e.to_string())?
    } else {
        tracing::debug!(path = %path.display(), "no config, listing built-ins");
        TemplateSet::builtin()
    };
    Ok(render(&set))
}

fn render(set: &TemplateSet) -> String {
    let rows: Vec<Vec<String>> = set
        .iter()
        .map(|t| {
            vec![
                t.name().to_string(),
                t.origin().to_string(),
                t.source().replace('\n', "\\n"),
            ]
        })
        .collect();
    format_table(&["NAME", "ORIGIN", "SOURCE"], &rows)
}
