//! Show the pass/fail trend over recent builds

use crate::commands::utils::{latest_result, open_repository};
use crate::commands::Command;
use crate::config::RobotrConfig;
use crate::error::Result;
use crate::trend::{outcome_series, Category, TrendOptions, TrendTarget};
use crate::ui::UI;

pub struct TrendCommand {
    base_path: Option<String>,
    config: RobotrConfig,
    path: Option<String>,
    failures_only: bool,
    critical_only: bool,
    max_builds: Option<usize>,
}

impl TrendCommand {
    pub fn new(base_path: Option<String>, config: RobotrConfig) -> Self {
        TrendCommand {
            base_path,
            config,
            path: None,
            failures_only: false,
            critical_only: false,
            max_builds: None,
        }
    }

    /// Restrict the trend to the suite or case at `path`
    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }

    pub fn with_failures_only(mut self, failures_only: bool) -> Self {
        self.failures_only = failures_only;
        self
    }

    pub fn with_critical_only(mut self, critical_only: bool) -> Self {
        self.critical_only = critical_only;
        self
    }

    /// Overrides `builds_to_show` from the configuration
    pub fn with_max_builds(mut self, max_builds: Option<usize>) -> Self {
        self.max_builds = max_builds;
        self
    }

    fn options(&self) -> TrendOptions {
        TrendOptions {
            failures_only: self.failures_only,
            critical_only: self.critical_only || self.config.only_critical,
            significant_data: true,
            max_builds_to_show: self.max_builds.unwrap_or(self.config.builds_to_show),
            label_format: self.config.x_axis_label_format.clone(),
        }
    }
}

impl Command for TrendCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let repo = open_repository(self.base_path.as_deref())?;
        let history = repo.load_history()?;
        let run = latest_result(&history)?;

        let target = match &self.path {
            None => TrendTarget::Run,
            Some(path) => match TrendTarget::for_path(&run, path) {
                Some(target) => target,
                None => {
                    ui.error(&format!("No suite or test at '{}'", path))?;
                    return Ok(1);
                }
            },
        };

        let series = outcome_series(&history, &run, &target, &self.options());
        if series.is_empty() {
            ui.output("No trend data")?;
            return Ok(0);
        }

        let mut rows = vec![vec![
            "Build".to_string(),
            Category::Passed.to_string(),
            Category::Failed.to_string(),
            Category::Skipped.to_string(),
        ]];
        let passed = series.values(Category::Passed);
        let failed = series.values(Category::Failed);
        let skipped = series.values(Category::Skipped);
        for (i, label) in series.labels().iter().enumerate() {
            rows.push(vec![
                label.text.clone(),
                passed[i].to_string(),
                failed[i].to_string(),
                skipped[i].to_string(),
            ]);
        }
        ui.output_table(&rows)?;

        if let (Some(lower), Some(upper)) = (series.lower_bound, series.upper_bound) {
            ui.output(&format!("Range: {:.2} - {:.2}", lower, upper))?;
        }
        Ok(0)
    }

    fn name(&self) -> &str {
        "trend"
    }

    fn help(&self) -> &str {
        "Show passed, failed and skipped counts over recent builds"
    }
}
