//! Show how long recent builds took

use crate::commands::utils::{latest_result, open_repository};
use crate::commands::Command;
use crate::config::RobotrConfig;
use crate::error::Result;
use crate::trend::{duration_series, TrendOptions, TrendTarget};
use crate::ui::UI;

pub struct DurationCommand {
    base_path: Option<String>,
    config: RobotrConfig,
    path: Option<String>,
    max_builds: Option<usize>,
}

impl DurationCommand {
    pub fn new(base_path: Option<String>, config: RobotrConfig) -> Self {
        DurationCommand {
            base_path,
            config,
            path: None,
            max_builds: None,
        }
    }

    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }

    pub fn with_max_builds(mut self, max_builds: Option<usize>) -> Self {
        self.max_builds = max_builds;
        self
    }
}

impl Command for DurationCommand {
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
        let options = TrendOptions {
            max_builds_to_show: self.max_builds.unwrap_or(self.config.builds_to_show),
            label_format: self.config.x_axis_label_format.clone(),
            ..TrendOptions::default()
        };

        let series = duration_series(&history, &run, &target, &options);
        if series.is_empty() {
            ui.output("No duration data")?;
            return Ok(0);
        }

        let mut rows = vec![vec![
            "Build".to_string(),
            format!("Duration ({})", series.unit()),
        ]];
        for (label, value) in &series.points {
            rows.push(vec![label.text.clone(), format!("{:.3}", value)]);
        }
        ui.output_table(&rows)?;
        Ok(0)
    }

    fn name(&self) -> &str {
        "duration"
    }

    fn help(&self) -> &str {
        "Show the duration of recent builds"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run_of, store_builds};
    use crate::model::CaseStatus;
    use crate::ui::test_ui::TestUI;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        store_builds(
            temp.path(),
            vec![
                Some(run_of(&[("a", CaseStatus::Passed)])),
                Some(run_of(&[("a", CaseStatus::Passed), ("b", CaseStatus::Passed)])),
            ],
        );
        temp
    }

    #[test]
    fn test_duration_command() {
        let temp = repo();
        let mut ui = TestUI::new();
        let cmd = DurationCommand::new(
            Some(temp.path().to_string_lossy().to_string()),
            RobotrConfig::default(),
        );
        assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
        assert_eq!(
            ui.output,
            vec!["Build  Duration (s)", "#1     1.500", "#2     3.000"]
        );
    }

    #[test]
    fn test_duration_of_case() {
        let temp = repo();
        let mut ui = TestUI::new();
        let cmd = DurationCommand::new(
            Some(temp.path().to_string_lossy().to_string()),
            RobotrConfig::default(),
        )
        .with_path(Some("Suite/b".to_string()));
        assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
        // Build 1 has no case b, so the walk stops there.
        assert_eq!(ui.output, vec!["Build  Duration (s)", "#2     1.500"]);
    }
}
