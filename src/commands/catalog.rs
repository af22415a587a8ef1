//! `jira-digest catalog` command.

use std::path::Path;

use crate::commands::format_table;
use crate::commands::report::load_sections;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::report::ReportSection;

/// Execute the `catalog` command: print every expanded section filter.
///
/// The tracker is never contacted.
///
/// # Errors
///
/// Returns an error string if the catalog cannot be loaded or expanded.
pub fn run(ctx: &ServiceContext, config: &Config, catalog: Option<&Path>) -> Result<(), String> {
    let path = config.catalog_path(catalog);
    let sections = load_sections(ctx, &path)?;
    print!("{}", render(&sections));
    Ok(())
}

fn render(sections: &[ReportSection]) -> String {
    if sections.is_empty() {
        return "No sections in catalog.\n".to_string();
    }
    let rows: Vec<Vec<String>> = sections
        .iter()
        .map(|s| vec![s.team.clone(), s.category.label().to_string(), s.filter.to_string()])
        .collect();
    let mut out = format_table(&["TEAM", "CATEGORY", "FILTER"], &rows);
    out.push_str(&format!("\n{} section(s)\n", sections.len()));
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::commands::test_support::{FixedClock, MemFs, ScriptedTracker};
    use crate::ports::FilterSpec;
    use crate::report::Category;

    #[test]
    fn empty_catalog_says_so() {
        assert_eq!(render(&[]), "No sections in catalog.\n");
    }

    #[test]
    fn renders_one_row_per_section() {
        let sections = vec![
            ReportSection::new("Perf", Category::InReview, FilterSpec::new("project = PERF")),
            ReportSection::new("Docs", Category::New, FilterSpec::new("project = DOCS")),
        ];
        assert_eq!(
            render(&sections),
            "TEAM  CATEGORY   FILTER\n\
             ----  ---------  --------------\n\
             Perf  In Review  project = PERF\n\
             Docs  New        project = DOCS\n\
             \n2 section(s)\n"
        );
    }

    #[test]
    fn run_reads_catalog_through_context() {
        let ctx = ServiceContext::new(
            Box::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap())),
            Box::new(MemFs::with(&[("/cfg/catalog.yaml", "teams: []\n")])),
            Box::new(ScriptedTracker::new(vec![])),
        );
        let yaml = "server:\n  url: https://issues.example.com\n";
        let config = Config::parse(yaml, Path::new("/cfg/jira.yaml")).unwrap();

        assert!(run(&ctx, &config, None).is_ok());
        assert!(run(&ctx, &config, Some(Path::new("/cfg/other.yaml"))).is_err());
    }
}
