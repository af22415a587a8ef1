//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::Command;

use chrono::{TimeZone, Utc};

use jira_digest::cassette::recorder::CassetteRecorder;
use jira_digest::error::TrackerError;
use jira_digest::ports::Issue;

fn run_digest(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_jira-digest");
    Command::new(bin)
        .args(args)
        .env_remove("JIRA_DIGEST_RECORD")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run jira-digest binary")
}

fn write_config(dir: &Path) -> String {
    let config = dir.join("jira.yaml");
    std::fs::write(
        &config,
        "server:\n  url: https://issues.example.com\nreport:\n  template: keys\n",
    )
    .unwrap();
    std::fs::write(dir.join("catalog.yaml"), "teams:\n  - name: Docs\n    project: DOCS\n")
        .unwrap();
    config.to_string_lossy().into_owned()
}

fn issue(key: &str) -> Issue {
    Issue {
        key: key.into(),
        summary: "Write the guide".into(),
        status: "Done".into(),
        assignee: None,
        created: None,
        updated: None,
        resolved: None,
        url: format!("https://issues.example.com/browse/{key}"),
        raw: serde_json::Value::Null,
    }
}

/// Records one four-section run for the `Docs` team.
fn write_cassette(dir: &Path, in_review: Result<Vec<Issue>, TrackerError>) -> String {
    let path = dir.join("docs.cassette.yaml");
    let mut recorder = CassetteRecorder::new(
        &path,
        "https://issues.example.com",
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap(),
    );
    recorder.record("finished", &Ok(vec![issue("DOCS-1"), issue("DOCS-2")]));
    recorder.record("in review", &in_review);
    recorder.record("in progress", &Ok(vec![]));
    recorder.record("new", &Ok(vec![issue("DOCS-9")]));
    recorder.write().unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn help_lists_subcommands() {
    let output = run_digest(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for command in ["report", "query", "templates", "catalog"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_digest(&["frobnicate"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("frobnicate"));
}

#[test]
fn templates_work_without_config() {
    let output = run_digest(&["templates", "--config", "/nonexistent/jira.yaml"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.starts_with("NAME"));
    assert!(stdout.contains("default"));
}

#[test]
fn log_file_records_debug_events_without_debug_flag() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("run.log");

    let output = run_digest(&[
        "templates",
        "--config",
        "/nonexistent/jira.yaml",
        "--log-file",
        log.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "stderr stays quiet without -v/-d");
    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("no config, listing built-ins"));
}

#[test]
fn template_file_renders_replayed_query() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let cassette = write_cassette(dir.path(), Ok(vec![]));
    let template = dir.path().join("count.md.j2");
    std::fs::write(&template, "{{ query }}: {{ issues | length }} issue(s)\n").unwrap();

    let output = run_digest(&[
        "query",
        "project = DOCS",
        "--template",
        template.to_str().unwrap(),
        "--config",
        &config,
        "--replay",
        &cassette,
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "project = DOCS: 2 issue(s)\n");
}

#[test]
fn report_without_config_fails() {
    let output = run_digest(&["report", "--config", "/nonexistent/jira.yaml"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("failed to read config"));
}

#[test]
fn catalog_prints_expanded_filters() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let output = run_digest(&["catalog", "--config", &config]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains(r#"project = "DOCS" AND status = Review ORDER BY key"#));
    assert!(stdout.contains("4 section(s)"));
}

#[test]
fn replayed_report_prints_digest_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let cassette = write_cassette(dir.path(), Ok(vec![]));
    let out = dir.path().join("digest.md");

    let output = run_digest(&[
        "--config",
        &config,
        "--replay",
        &cassette,
        "report",
        "--output",
        out.to_str().unwrap(),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let expected = "# Docs\n\
                    * Finished issues\n    * DOCS-1\n    * DOCS-2\n\n\
                    * In Review issues\n\n\
                    * In Progress issues\n\n\
                    * New issues\n    * DOCS-9\n\n";
    assert_eq!(stdout, expected);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), expected);
}

#[test]
fn replayed_failure_aborts_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let cassette =
        write_cassette(dir.path(), Err(TrackerError::Query("Field 'x' does not exist.".into())));

    let output =
        run_digest(&["--config", &config, "--replay", &cassette, "report", "--no-scratch"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("query for Docs / In Review failed"));
}

#[test]
fn replayed_failure_with_keep_going_renders_inline() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let cassette =
        write_cassette(dir.path(), Err(TrackerError::Query("Field 'x' does not exist.".into())));

    let output = run_digest(&[
        "--config",
        &config,
        "--replay",
        &cassette,
        "report",
        "--no-scratch",
        "--keep-going",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.contains(
        "* In Review issues\n    * query failed: query rejected: Field 'x' does not exist.\n\n"
    ));
    assert!(stdout.contains("* New issues\n    * DOCS-9\n"));
}

#[test]
fn replayed_query_renders_template() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let cassette = write_cassette(dir.path(), Ok(vec![]));

    let output = run_digest(&[
        "query",
        "project = DOCS",
        "--template",
        "default",
        "--config",
        &config,
        "--replay",
        &cassette,
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert_eq!(
        stdout,
        "* [DOCS-1](https://issues.example.com/browse/DOCS-1) Write the guide\n\
         * [DOCS-2](https://issues.example.com/browse/DOCS-2) Write the guide\n"
    );
}
