//! Command system for robotrepo
//!
//! Commands are discovered and executed through the Command trait.

use crate::error::Result;
use crate::ui::UI;

pub mod duration;
pub mod failing;
pub mod help;
pub mod init;
pub mod last;
pub mod load;
pub mod show;
pub mod stats;
pub mod trend;
mod utils;

pub use duration::DurationCommand;
pub use failing::FailingCommand;
pub use help::HelpCommand;
pub use init::InitCommand;
pub use last::LastCommand;
pub use load::LoadCommand;
pub use show::ShowCommand;
pub use stats::StatsCommand;
pub use trend::TrendCommand;

/// Trait that all commands must implement
pub trait Command {
    /// Execute the command
    fn execute(&self, ui: &mut dyn UI) -> Result<i32>;

    /// Get the command name
    fn name(&self) -> &str;

    /// Get command help text
    fn help(&self) -> &str;
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::model::{CaseResult, CaseStatus, SuiteResult, TestRun};
    use crate::repository::file::FileRepositoryFactory;
    use crate::repository::RepositoryFactory;
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    /// A run with one suite holding the given cases.
    pub fn run_of(cases: &[(&str, CaseStatus)]) -> TestRun {
        let mut suite = SuiteResult::new("Suite");
        for (name, status) in cases {
            let case = match status {
                CaseStatus::Failed => CaseResult::failed(*name, "boom"),
                other => CaseResult::passed(*name).with_outcome(*other),
            };
            suite.add_case(case.with_duration(1500));
        }
        let mut run = TestRun::new().with_timestamp("20100629 11:08:54.230");
        run.add_suite(suite);
        run
    }

    /// Initialise a repository under `base` and store one build per entry.
    pub fn store_builds(base: &Path, runs: Vec<Option<TestRun>>) {
        let mut repo = FileRepositoryFactory.initialise(base).unwrap();
        for (i, run) in runs.into_iter().enumerate() {
            let time = Utc.with_ymd_and_hms(2024, 5, i as u32 + 1, 8, 0, 0).unwrap();
            repo.insert_build_at(run, time).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockCommand;

    impl Command for MockCommand {
        fn execute(&self, _ui: &mut dyn UI) -> Result<i32> {
            Ok(0)
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn help(&self) -> &str {
            "A mock command for testing"
        }
    }

    #[test]
    fn test_command_trait() {
        let cmd = MockCommand;
        assert_eq!(cmd.name(), "mock");
        assert_eq!(cmd.help(), "A mock command for testing");
    }
}
