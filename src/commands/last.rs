//! Show the most recent build with results

use crate::commands::utils::{open_repository, output_summary, select_result};
use crate::commands::Command;
use crate::config::RobotrConfig;
use crate::error::Result;
use crate::regression::RegressionTracker;
use crate::ui::UI;

pub struct LastCommand {
    base_path: Option<String>,
    config: RobotrConfig,
    build: Option<u32>,
    show_output: bool,
}

impl LastCommand {
    pub fn new(base_path: Option<String>, config: RobotrConfig) -> Self {
        LastCommand {
            base_path,
            config,
            build: None,
            show_output: true,
        }
    }

    /// Show this build instead of the latest one
    pub fn with_build(mut self, build: Option<u32>) -> Self {
        self.build = build;
        self
    }

    /// Whether to print messages and traces of failed cases
    pub fn with_output_control(mut self, show_output: bool) -> Self {
        self.show_output = show_output;
        self
    }
}

impl Command for LastCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let repo = open_repository(self.base_path.as_deref())?;
        let history = repo.load_history()?;
        let run = select_result(&history, self.build)?;

        output_summary(ui, &run, &self.config)?;

        let failed = run.failed_cases();
        if failed.is_empty() {
            return Ok(0);
        }

        let tracker = RegressionTracker::new(&history);
        ui.output("")?;
        ui.output("Failed tests:")?;
        for case in failed {
            let criticality = if case.is_critical() { "" } else { " (non-critical)" };
            ui.output(&format!(
                "  {}{}  [failing since #{}, age {}]",
                case.full_name(),
                criticality,
                tracker.failed_since(case),
                tracker.age(case)
            ))?;
            if !self.show_output {
                continue;
            }
            if let Some(message) = case.error_msg() {
                for line in message.lines() {
                    ui.output(&format!("    {}", line))?;
                }
            }
            if let Some(trace) = case.stack_trace() {
                for line in trace.lines() {
                    ui.output(&format!("    {}", line))?;
                }
            }
        }
        Ok(1)
    }

    fn name(&self) -> &str {
        "last"
    }

    fn help(&self) -> &str {
        "Show the results of the most recent build"
    }
}
