//! Show failing tests of the most recent build

use crate::commands::utils::{latest_result, open_repository};
use crate::commands::Command;
use crate::error::Result;
use crate::regression::RegressionTracker;
use crate::ui::UI;

pub struct FailingCommand {
    base_path: Option<String>,
    list_only: bool,
}

impl FailingCommand {
    pub fn new(base_path: Option<String>) -> Self {
        FailingCommand {
            base_path,
            list_only: false,
        }
    }

    pub fn with_list_only(base_path: Option<String>) -> Self {
        FailingCommand {
            base_path,
            list_only: true,
        }
    }
}

impl Command for FailingCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let repo = open_repository(self.base_path.as_deref())?;
        let history = repo.load_history()?;
        let run = latest_result(&history)?;
        let failing = run.failed_cases();

        if failing.is_empty() {
            if !self.list_only {
                ui.output("No failing tests")?;
            }
            return Ok(0);
        }

        if self.list_only {
            for case in failing {
                ui.output(&case.id())?;
            }
        } else {
            let tracker = RegressionTracker::new(&history);
            let rows: Vec<Vec<String>> = failing
                .iter()
                .map(|case| {
                    let since = tracker
                        .failed_since_build(case)
                        .map(|b| b.display_name())
                        .unwrap_or_default();
                    vec![
                        format!("  {}", case.full_name()),
                        if case.is_critical() { "critical" } else { "non-critical" }.to_string(),
                        format!("since {}", since),
                        format!("age {}", tracker.age(case)),
                    ]
                })
                .collect();
            ui.output(&format!("{} failing test(s):", failing.len()))?;
            ui.output_table(&rows)?;
        }
        Ok(1)
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn help(&self) -> &str {
        "Show tests that failed in the most recent build"
    }
}
