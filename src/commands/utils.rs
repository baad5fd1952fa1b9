//! Utility functions for command implementation

use crate::config::RobotrConfig;
use crate::error::{Error, Result};
use crate::history::{BuildHistory, InMemoryHistory};
use crate::model::TestRun;
use crate::ui::UI;
use crate::repository::file::FileRepositoryFactory;
use crate::repository::{Repository, RepositoryFactory};
use std::path::Path;
use std::sync::Arc;

/// Base directory from an optional path argument
pub fn base_dir(base_path: Option<&str>) -> &Path {
    base_path.map(Path::new).unwrap_or_else(|| Path::new("."))
}

/// Open a repository at the given path (or current directory if None)
pub fn open_repository(base_path: Option<&str>) -> Result<Box<dyn Repository>> {
    FileRepositoryFactory.open(base_dir(base_path))
}

/// Initialize a repository at the given path (or current directory if None)
pub fn init_repository(base_path: Option<&str>) -> Result<Box<dyn Repository>> {
    FileRepositoryFactory.initialise(base_dir(base_path))
}

/// Most recent result in the history, skipping builds without one
pub fn latest_result(history: &InMemoryHistory) -> Result<Arc<TestRun>> {
    if history.is_empty() {
        return Err(Error::NoBuilds);
    }
    history
        .builds()
        .find_map(|build| history.result(build.number))
        .ok_or_else(|| Error::Other("No build in the repository has results".to_string()))
}

/// Result of a given build, or the most recent one
pub fn select_result(history: &InMemoryHistory, build: Option<u32>) -> Result<Arc<TestRun>> {
    match build {
        Some(number) => {
            history.build(number).ok_or(Error::BuildNotFound(number))?;
            history
                .result(number)
                .ok_or_else(|| Error::Other(format!("Build #{} has no results", number)))
        }
        None => latest_result(history),
    }
}

/// Milliseconds as seconds with millisecond precision
pub fn format_duration(millis: u64) -> String {
    format!("{:.3}s", millis as f64 / 1000.0)
}

/// Print the headline numbers of a run.
pub fn output_summary(ui: &mut dyn UI, run: &TestRun, config: &RobotrConfig) -> Result<()> {
    let build = run
        .owner()
        .map(|b| b.display_name())
        .unwrap_or_else(|| "(unbound)".to_string());
    match run.timestamp() {
        Some(generated) => ui.output(&format!("Build {} (generated {})", build, generated))?,
        None => ui.output(&format!("Build {}", build))?,
    }
    ui.output(&format!(
        "Total: {}  Passed: {}  Failed: {}  Skipped: {}",
        run.total(),
        run.passed(),
        run.failed(),
        run.skipped()
    ))?;
    ui.output(&format!(
        "Critical: {} / {}",
        run.critical_passed(),
        run.critical_total()
    ))?;
    ui.output(&format!(
        "Pass percentage: {:.1}%",
        run.pass_percentage(config.only_critical, config.count_skipped_tests)
    ))?;
    ui.output(&format!("Duration: {}", format_duration(run.duration())))?;
    Ok(())
}
