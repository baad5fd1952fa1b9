//! Persistence of parsed results, one blob per build
//!
//! The repository plays the host's part: it numbers builds, stores the
//! tallied [`TestRun`] of each as an opaque blob and hands the whole history
//! back as an [`InMemoryHistory`].

use crate::error::Result;
use crate::history::{Build, InMemoryHistory};
use crate::model::TestRun;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod file;

/// A build together with the result attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBuild {
    pub build: Build,
    #[serde(default)]
    pub result: Option<TestRun>,
}

/// Abstract repository trait for build result storage
///
/// # Examples
///
/// ```
/// use robotrepo::model::{CaseResult, SuiteResult, TestRun};
/// use robotrepo::repository::{Repository, RepositoryFactory};
/// use robotrepo::repository::file::FileRepositoryFactory;
/// use tempfile::TempDir;
///
/// # fn main() -> robotrepo::error::Result<()> {
/// let temp = TempDir::new().unwrap();
/// let mut repo = FileRepositoryFactory.initialise(temp.path())?;
///
/// let mut suite = SuiteResult::new("Suite");
/// suite.add_case(CaseResult::passed("works"));
/// suite.add_case(CaseResult::failed("breaks", "assertion failed"));
/// let mut run = TestRun::new();
/// run.add_suite(suite);
///
/// let build = repo.insert_build(Some(run))?;
/// assert_eq!(build.number, 1);
///
/// let latest = repo.get_latest_build()?;
/// let result = latest.result.unwrap();
/// assert_eq!(result.failed(), 1);
/// assert_eq!(result.owner().unwrap().number, 1);
/// # Ok(())
/// # }
/// ```
pub trait Repository {
    /// Store `result` as a new build stamped with `timestamp`.
    fn insert_build_at(
        &mut self,
        result: Option<TestRun>,
        timestamp: DateTime<Utc>,
    ) -> Result<Build>;

    /// Store `result` as a new build stamped with the current time.
    fn insert_build(&mut self, result: Option<TestRun>) -> Result<Build> {
        self.insert_build_at(result, Utc::now())
    }

    /// Get a build and its tallied result
    fn get_build(&self, number: u32) -> Result<StoredBuild>;

    /// Get the most recent build
    fn get_latest_build(&self) -> Result<StoredBuild>;

    /// Number the next inserted build will get
    fn get_next_build_number(&self) -> Result<u32>;

    /// Numbers of all stored builds, ascending
    fn list_build_numbers(&self) -> Result<Vec<u32>>;

    /// Get the number of stored builds
    fn count(&self) -> Result<usize> {
        Ok(self.list_build_numbers()?.len())
    }

    /// Load every build into a history for trend and regression queries.
    fn load_history(&self) -> Result<InMemoryHistory> {
        let mut history = InMemoryHistory::new();
        for number in self.list_build_numbers()? {
            let stored = self.get_build(number)?;
            history.add(stored.build, stored.result);
        }
        Ok(history)
    }
}

/// Factory trait for creating and opening repositories
pub trait RepositoryFactory {
    /// Create a new repository at the given base path
    fn initialise(&self, base: &Path) -> Result<Box<dyn Repository>>;

    /// Open an existing repository at the given base path
    fn open(&self, base: &Path) -> Result<Box<dyn Repository>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_build_without_result() {
        let stored: StoredBuild = serde_json::from_str(
            r#"{"build":{"number":3,"timestamp":"2024-01-01T00:00:00Z"}}"#,
        )
        .unwrap();
        assert_eq!(stored.build.number, 3);
        assert!(stored.build.display_name.is_none());
        assert!(stored.result.is_none());
    }
}
