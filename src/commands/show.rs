//! Show a single suite or case of a build

use crate::commands::utils::{format_duration, open_repository, select_result};
use crate::commands::Command;
use crate::error::Result;
use crate::history::InMemoryHistory;
use crate::model::{CaseResult, SuiteResult, TestObject};
use crate::regression::RegressionTracker;
use crate::ui::UI;

pub struct ShowCommand {
    base_path: Option<String>,
    path: String,
    build: Option<u32>,
}

impl ShowCommand {
    /// `path` is the `/`-separated path of duplicate-safe names.
    pub fn new(base_path: Option<String>, path: impl Into<String>) -> Self {
        ShowCommand {
            base_path,
            path: path.into(),
            build: None,
        }
    }

    pub fn with_build(mut self, build: Option<u32>) -> Self {
        self.build = build;
        self
    }

    fn show_suite(&self, ui: &mut dyn UI, suite: &SuiteResult) -> Result<()> {
        ui.output(&format!("Suite: {}", suite.full_name()))?;
        if let Some(description) = suite.description() {
            ui.output(&format!("Description: {}", description))?;
        }
        if let Some(source) = suite.source() {
            ui.output(&format!("Source: {}", source))?;
        }
        let totals = suite.totals();
        ui.output(&format!(
            "Passed: {}  Failed: {}  Skipped: {}",
            totals.passed, totals.failed, totals.skipped
        ))?;
        ui.output(&format!(
            "Critical: {} / {}",
            totals.critical_passed,
            totals.critical_total()
        ))?;
        ui.output(&format!("Duration: {}", format_duration(suite.duration())))?;

        let mut rows = Vec::new();
        for child in suite.child_suites() {
            rows.push(vec![
                format!("  {}/", child.duplicate_safe_name()),
                format!("{} / {}", child.passed(), child.totals().total()),
                format_duration(child.duration()),
            ]);
        }
        for case in suite.cases() {
            rows.push(vec![
                format!("  {}", case.duplicate_safe_name()),
                case.status().to_string(),
                format_duration(case.duration()),
            ]);
        }
        if !rows.is_empty() {
            ui.output("")?;
            ui.output_table(&rows)?;
        }
        Ok(())
    }

    fn show_case(&self, ui: &mut dyn UI, history: &InMemoryHistory, case: &CaseResult) -> Result<()> {
        ui.output(&format!("Test: {}", case.full_name()))?;
        ui.output(&format!("Status: {}", case.status()))?;
        ui.output(&format!("Critical: {}", if case.is_critical() { "yes" } else { "no" }))?;
        ui.output(&format!("Duration: {}", format_duration(case.duration())))?;
        if let Some(description) = case.description() {
            ui.output(&format!("Description: {}", description))?;
        }
        if !case.tags().is_empty() {
            ui.output(&format!("Tags: {}", case.tags().join(", ")))?;
        }
        if case.is_failed() {
            let tracker = RegressionTracker::new(history);
            ui.output(&format!(
                "Failing since: #{} (age {})",
                tracker.failed_since(case),
                tracker.age(case)
            ))?;
        }
        if let Some(message) = case.error_msg() {
            ui.output("Message:")?;
            for line in message.lines() {
                ui.output(&format!("  {}", line))?;
            }
        }
        if let Some(trace) = case.stack_trace() {
            ui.output("Trace:")?;
            for line in trace.lines() {
                ui.output(&format!("  {}", line))?;
            }
        }
        Ok(())
    }
}

impl Command for ShowCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let repo = open_repository(self.base_path.as_deref())?;
        let history = repo.load_history()?;
        let run = select_result(&history, self.build)?;

        match run.find_by_path(&self.path) {
            Some(TestObject::Suite(suite)) => self.show_suite(ui, suite)?,
            Some(TestObject::Case(case)) => self.show_case(ui, &history, case)?,
            None => {
                ui.error(&format!("No suite or test at '{}'", self.path))?;
                return Ok(1);
            }
        }
        Ok(0)
    }

    fn name(&self) -> &str {
        "show"
    }

    fn help(&self) -> &str {
        "Show a suite or test of a build by path"
    }
}
