//! Show repository statistics

use crate::commands::utils::{format_duration, open_repository};
use crate::commands::Command;
use crate::config::RobotrConfig;
use crate::error::Result;
use crate::history::BuildHistory;
use crate::ui::UI;

pub struct StatsCommand {
    base_path: Option<String>,
    config: RobotrConfig,
}

impl StatsCommand {
    pub fn new(base_path: Option<String>, config: RobotrConfig) -> Self {
        StatsCommand { base_path, config }
    }
}

impl Command for StatsCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let repo = open_repository(self.base_path.as_deref())?;
        let history = repo.load_history()?;

        let with_results: Vec<_> = history
            .builds()
            .filter_map(|b| history.result(b.number))
            .collect();

        ui.output("Repository Statistics:")?;
        ui.output(&format!("  Builds: {}", history.len()))?;
        ui.output(&format!("  Builds with results: {}", with_results.len()))?;

        let Some(latest) = with_results.first() else {
            return Ok(0);
        };
        let build = latest
            .owner()
            .map(|b| b.display_name())
            .unwrap_or_default();
        ui.output(&format!("  Latest build with results: {}", build))?;
        ui.output(&format!("  Suites: {}", latest.all_suites().len()))?;
        ui.output(&format!("  Tests passed: {}", latest.pass_ratio()))?;
        ui.output(&format!(
            "  Pass percentage: {:.1}%",
            latest.pass_percentage(self.config.only_critical, self.config.count_skipped_tests)
        ))?;
        ui.output(&format!(
            "  Critical pass percentage: {:.1}%",
            latest.pass_percentage(true, false)
        ))?;
        if latest.statistics().is_legacy() {
            ui.output("  Statistics: legacy category totals")?;
        }
        for stat in latest.report_statistics() {
            ui.output(&format!(
                "  Report {}: {} passed, {} failed, {} skipped",
                stat.label.as_deref().unwrap_or("total"),
                stat.pass,
                stat.fail,
                stat.skip
            ))?;
        }

        let executed: u64 = with_results.iter().map(|r| r.total() + r.skipped()).sum();
        let duration: u64 = with_results.iter().map(|r| r.duration()).sum();
        ui.output(&format!("  Tests executed over all builds: {}", executed))?;
        ui.output(&format!("  Time spent over all builds: {}", format_duration(duration)))?;

        Ok(0)
    }

    fn name(&self) -> &str {
        "stats"
    }

    fn help(&self) -> &str {
        "Show repository statistics"
    }
}
