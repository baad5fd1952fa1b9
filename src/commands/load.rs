//! Parse runner reports and store them as a new build

use crate::commands::utils::{base_dir, output_summary};
use crate::commands::Command;
use crate::config::RobotrConfig;
use crate::error::{Error, Result};
use crate::parser::ReportParser;
use crate::repository::file::FileRepositoryFactory;
use crate::repository::RepositoryFactory;
use crate::ui::UI;

pub struct LoadCommand {
    base_path: Option<String>,
    config: RobotrConfig,
    force_init: bool,
    allow_missing: bool,
}

impl LoadCommand {
    pub fn new(base_path: Option<String>, config: RobotrConfig) -> Self {
        LoadCommand {
            base_path,
            config,
            force_init: false,
            allow_missing: false,
        }
    }

    /// Create the repository if it does not exist yet
    pub fn with_force_init(mut self, force_init: bool) -> Self {
        self.force_init = force_init;
        self
    }

    /// Record a build without results when no report matches
    pub fn with_allow_missing(mut self, allow_missing: bool) -> Self {
        self.allow_missing = allow_missing;
        self
    }
}

impl Command for LoadCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let base = base_dir(self.base_path.as_deref());

        let factory = FileRepositoryFactory;
        let mut repo = if self.force_init {
            factory.open(base).or_else(|_| factory.initialise(base))?
        } else {
            factory.open(base)?
        };

        let parser = ReportParser::new(
            self.config.report_dir(base),
            self.config.output_file_mask.clone(),
        );
        let run = match parser.parse() {
            Ok(run) => Some(run),
            Err(e @ Error::NoReportsFound { .. }) if self.allow_missing => {
                ui.warning(&e.to_string())?;
                None
            }
            Err(e) => return Err(e),
        };

        let build = repo.insert_build(run)?;
        let stored = repo.get_build(build.number)?;
        match stored.result {
            None => {
                ui.output(&format!("Recorded build {} without results", build))?;
                Ok(0)
            }
            Some(run) => {
                ui.output(&format!(
                    "Loaded {} suite(s), {} test(s) as build {}",
                    run.all_suites().len(),
                    run.all_cases().len(),
                    build
                ))?;
                output_summary(ui, &run, &self.config)?;
                Ok(if run.failed() > 0 { 1 } else { 0 })
            }
        }
    }

    fn name(&self) -> &str {
        "load"
    }

    fn help(&self) -> &str {
        "Parse report files and store them as a new build"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repository;
    use crate::ui::test_ui::TestUI;
    use std::fs;
    use tempfile::TempDir;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<robot generated="20100629 11:08:54.230">
<suite name="Suite">
<test name="Passing"><status status="PASS" starttime="20100629 11:08:54.230" endtime="20100629 11:08:55.230"/></test>
<test name="Failing"><status status="FAIL" starttime="20100629 11:08:55.230" endtime="20100629 11:08:55.730">Oops</status></test>
</suite>
</robot>"#;

    fn path_of(temp: &TempDir) -> Option<String> {
        Some(temp.path().to_string_lossy().to_string())
    }

    #[test]
    fn test_load_report() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("output.xml"), REPORT).unwrap();
        let mut ui = TestUI::new();

        let cmd = LoadCommand::new(path_of(&temp), RobotrConfig::default()).with_force_init(true);
        assert_eq!(cmd.execute(&mut ui).unwrap(), 1);

        let text = ui.text();
        assert!(text.contains("Loaded 1 suite(s), 2 test(s) as build #1"));
        assert!(text.contains("Passed: 1  Failed: 1"));
        assert!(text.contains("Pass percentage: 50.0%"));
        assert!(text.contains("Duration: 1.500s"));
    }

    #[test]
    fn test_load_without_repository() {
        let temp = TempDir::new().unwrap();
        let mut ui = TestUI::new();
        let cmd = LoadCommand::new(path_of(&temp), RobotrConfig::default());
        assert!(matches!(
            cmd.execute(&mut ui),
            Err(Error::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn test_missing_reports() {
        let temp = TempDir::new().unwrap();
        let mut ui = TestUI::new();

        let cmd = LoadCommand::new(path_of(&temp), RobotrConfig::default()).with_force_init(true);
        assert!(matches!(
            cmd.execute(&mut ui),
            Err(Error::NoReportsFound { .. })
        ));

        let cmd = cmd.with_allow_missing(true);
        assert_eq!(cmd.execute(&mut ui).unwrap(), 0);
        assert!(ui.errors[0].starts_with("Warning: No files found"));

        let repo = FileRepositoryFactory.open(temp.path()).unwrap();
        assert!(repo.get_latest_build().unwrap().result.is_none());
    }

    #[test]
    fn test_configured_output_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("results/run1")).unwrap();
        fs::write(temp.path().join("results/run1/output-a.xml"), REPORT).unwrap();
        let config = RobotrConfig {
            output_path: "results".into(),
            output_file_mask: "**/output-*.xml".to_string(),
            ..Default::default()
        };

        let mut ui = TestUI::new();
        let cmd = LoadCommand::new(path_of(&temp), config).with_force_init(true);
        assert_eq!(cmd.execute(&mut ui).unwrap(), 1);
        assert!(ui.text().contains("2 test(s)"));
    }
}
