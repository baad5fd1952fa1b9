//! Integration tests for full workflows
//!
//! These tests exercise complete user workflows by running actual commands
//! against real repositories in temporary directories.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use robotrepo::commands::{
    Command, DurationCommand, FailingCommand, InitCommand, LastCommand, LoadCommand,
    ShowCommand, StatsCommand, TrendCommand,
};
use robotrepo::config::RobotrConfig;
use robotrepo::repository::file::FileRepositoryFactory;
use robotrepo::repository::{Repository, RepositoryFactory};
use robotrepo::ui::UI;

/// Simple test UI that captures output for assertions
struct TestUI {
    output: Vec<String>,
    errors: Vec<String>,
}

impl TestUI {
    fn new() -> Self {
        TestUI {
            output: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn text(&self) -> String {
        self.output.join("\n")
    }
}

impl UI for TestUI {
    fn output(&mut self, message: &str) -> robotrepo::Result<()> {
        self.output.push(message.to_string());
        Ok(())
    }

    fn error(&mut self, message: &str) -> robotrepo::Result<()> {
        self.errors.push(message.to_string());
        Ok(())
    }

    fn warning(&mut self, message: &str) -> robotrepo::Result<()> {
        self.errors.push(format!("Warning: {}", message));
        Ok(())
    }
}

/// A report for one suite; each entry is (test name, status, elapsed seconds).
fn report(generated: &str, tests: &[(&str, &str, &str)]) -> String {
    let mut body = String::new();
    for (i, (name, status, elapsed)) in tests.iter().enumerate() {
        let message = if *status == "FAIL" { "Expected 1 but was 2" } else { "" };
        body.push_str(&format!(
            "<test id=\"s1-t{}\" name=\"{}\">\n\
             <kw name=\"Should Be Equal\"><arg>1</arg><arg>2</arg>\
             <status status=\"{}\" start=\"2024-01-01T10:00:00.000000\" elapsed=\"{}\"/></kw>\n\
             <status status=\"{}\" start=\"2024-01-01T10:00:00.000000\" elapsed=\"{}\">{}</status>\n\
             </test>\n",
            i + 1,
            name,
            status,
            elapsed,
            status,
            elapsed,
            message
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <robot generator=\"Robot 7.0\" generated=\"{}\" rpa=\"false\" schemaversion=\"5\">\n\
         <suite id=\"s1\" name=\"Login\" source=\"/work/login.robot\">\n{}</suite>\n\
         <errors></errors>\n</robot>\n",
        generated, body
    )
}

fn base(temp: &TempDir) -> Option<String> {
    Some(temp.path().to_string_lossy().to_string())
}

fn load(temp: &TempDir, config: &RobotrConfig, content: &str) -> i32 {
    let dir = temp.path().join(&config.output_path);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("output.xml"), content).unwrap();
    let mut ui = TestUI::new();
    LoadCommand::new(base(temp), config.clone())
        .execute(&mut ui)
        .unwrap()
}

fn init(path: &Path) {
    let mut ui = TestUI::new();
    let cmd = InitCommand::new(Some(path.to_string_lossy().to_string()));
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert!(ui.output[0].contains("Initialized"));
}

#[test]
fn test_full_workflow_init_load_last() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    assert!(temp.path().join(".robotr/format").exists());

    let config = RobotrConfig::default();
    let first = report(
        "2024-01-01T10:00:00.000000",
        &[("Valid", "PASS", "1.000"), ("Invalid", "PASS", "0.500")],
    );
    assert_eq!(load(&temp, &config, &first), 0);

    let second = report(
        "2024-01-02T10:00:00.000000",
        &[("Valid", "PASS", "1.000"), ("Invalid", "FAIL", "0.750")],
    );
    assert_eq!(load(&temp, &config, &second), 1);

    let mut ui = TestUI::new();
    let cmd = LastCommand::new(base(&temp), config.clone());
    assert_eq!(cmd.execute(&mut ui).unwrap(), 1);
    let text = ui.text();
    assert_eq!(ui.output[0], "Build #2 (generated 2024-01-02T10:00:00.000000)");
    assert!(text.contains("Total: 2  Passed: 1  Failed: 1  Skipped: 0"));
    assert!(text.contains("Pass percentage: 50.0%"));
    assert!(text.contains("Duration: 1.750s"));
    assert!(text.contains("  Login.Invalid  [failing since #2, age 1]"));
    assert!(text.contains("    Expected 1 but was 2"));
    assert!(text.contains("    Should Be Equal    1    2"));

    let mut ui = TestUI::new();
    let cmd = LastCommand::new(base(&temp), config).with_build(Some(1));
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert!(ui.text().contains("Pass percentage: 100.0%"));
}

#[test]
fn test_failure_streak_across_loads() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    let config = RobotrConfig::default();

    load(&temp, &config, &report("2024-01-01T10:00:00.000000", &[("A", "PASS", "1")]));
    load(&temp, &config, &report("2024-01-02T10:00:00.000000", &[("A", "FAIL", "1")]));
    load(&temp, &config, &report("2024-01-03T10:00:00.000000", &[("A", "FAIL", "1")]));

    let mut ui = TestUI::new();
    assert_eq!(FailingCommand::new(base(&temp)).execute(&mut ui).unwrap(), 1);
    assert_eq!(ui.output[0], "1 failing test(s):");
    assert_eq!(ui.output[1], "  Login.A  critical  since #2  age 2");

    let mut ui = TestUI::new();
    let cmd = FailingCommand::with_list_only(base(&temp));
    assert_eq!(cmd.execute(&mut ui).unwrap(), 1);
    assert_eq!(ui.output, vec!["Login/A"]);

    let mut ui = TestUI::new();
    let cmd = ShowCommand::new(base(&temp), "Login/A");
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert!(ui.text().contains("Failing since: #2 (age 2)"));
}

#[test]
fn test_trend_and_duration_workflow() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    fs::write(
        temp.path().join(".robotr.conf"),
        "[DEFAULT]\noutput_path=results\nbuilds_to_show=2\n",
    )
    .unwrap();
    let config = RobotrConfig::load(temp.path()).unwrap();
    assert_eq!(config.builds_to_show, 2);

    load(&temp, &config, &report("2024-01-01T10:00:00.000000", &[("A", "PASS", "30")]));
    load(&temp, &config, &report("2024-01-02T10:00:00.000000", &[("A", "FAIL", "61")]));
    load(&temp, &config, &report("2024-01-03T10:00:00.000000", &[("A", "PASS", "90")]));

    let mut ui = TestUI::new();
    let cmd = TrendCommand::new(base(&temp), config.clone());
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert_eq!(ui.output[0], "Build  Passed  Failed  Skipped");
    assert_eq!(ui.output[1], "#2     0       1       0");
    assert_eq!(ui.output[2], "#3     1       0       0");

    let mut ui = TestUI::new();
    let cmd = TrendCommand::new(base(&temp), config.clone()).with_max_builds(Some(0));
    cmd.execute(&mut ui).unwrap();
    assert_eq!(ui.output.len(), 5);

    let mut ui = TestUI::new();
    let cmd = DurationCommand::new(base(&temp), config).with_max_builds(Some(0));
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert_eq!(
        ui.output,
        vec!["Build  Duration (min)", "#1     0.500", "#2     1.017", "#3     1.500"]
    );
}

#[test]
fn test_stats_after_loads() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    let config = RobotrConfig::default();
    load(
        &temp,
        &config,
        &report(
            "2024-01-01T10:00:00.000000",
            &[("A", "PASS", "1"), ("B", "PASS", "1"), ("C", "FAIL", "1")],
        ),
    );

    let mut ui = TestUI::new();
    let cmd = StatsCommand::new(base(&temp), config);
    assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
    assert_eq!(ui.output[0], "Repository Statistics:");
    assert!(ui.text().contains("Builds: 1"));
    assert!(ui.text().contains("Tests passed: 2 / 3"));
    assert!(ui.text().contains("Pass percentage: 66.6%"));
}

#[test]
fn test_stored_builds_survive_reopen() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    let config = RobotrConfig::default();
    load(&temp, &config, &report("2024-01-01T10:00:00.000000", &[("A", "SKIP", "0")]));

    let repo = FileRepositoryFactory.open(temp.path()).unwrap();
    assert_eq!(repo.get_next_build_number().unwrap(), 2);
    let stored = repo.get_latest_build().unwrap();
    let run = stored.result.unwrap();
    assert_eq!(run.skipped(), 1);
    assert_eq!(run.pass_percentage(false, false), 100.0);
    assert_eq!(run.pass_percentage(false, true), 0.0);
    assert!(temp.path().join(".robotr/builds/1.json").exists());
}
