//! Trend series assembled from a run and its predecessors
//!
//! Both series walk the history backward from a starting run, at most
//! `max_builds_to_show` builds deep (0 means the whole history), and stop
//! early once the target no longer exists in an earlier run.

pub mod duration;
pub mod label;
pub mod outcome;

pub use duration::{duration_series, DurationSeries, TimeScale};
pub use label::{BuildLabel, DEFAULT_LABEL_FORMAT};
pub use outcome::{outcome_series, Category, DataPoint, OutcomeSeries};

use crate::history::{BuildHistory, HistoryLinker};
use crate::model::{TestObject, TestRun};
use tracing::debug;

/// What a series is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendTarget {
    /// The whole run
    Run,
    /// A suite, by path
    Suite(String),
    /// A case, by path
    Case(String),
}

impl TrendTarget {
    /// Target for a path: a suite or a case, whichever `run` has there.
    pub fn for_path(run: &TestRun, path: &str) -> Option<TrendTarget> {
        match run.find_by_path(path)? {
            TestObject::Suite(_) => Some(TrendTarget::Suite(path.to_string())),
            TestObject::Case(_) => Some(TrendTarget::Case(path.to_string())),
        }
    }
}

/// Options shared by both series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendOptions {
    /// Report failures only; passed and skipped become 0.
    pub failures_only: bool,
    /// Use the critical subset counts.
    pub critical_only: bool,
    /// Compute explicit y-axis bounds.
    pub significant_data: bool,
    /// Builds to include, 0 for all.
    pub max_builds_to_show: usize,
    pub label_format: String,
}

impl Default for TrendOptions {
    fn default() -> Self {
        TrendOptions {
            failures_only: false,
            critical_only: false,
            significant_data: false,
            max_builds_to_show: 0,
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
        }
    }
}

/// Visit `start` and then earlier runs, newest first.
///
/// The walk ends when `visit` returns false, when the history has no earlier
/// run, or once `max_builds` runs were visited.
pub(crate) fn walk_history<H, F>(history: &H, start: &TestRun, max_builds: usize, mut visit: F)
where
    H: BuildHistory + ?Sized,
    F: FnMut(&TestRun) -> bool,
{
    let linker = HistoryLinker::new(history);
    if !visit(start) {
        return;
    }
    let mut visited = 1;
    let mut current = linker.previous_run(start);
    while let Some(run) = current {
        if max_builds != 0 && visited >= max_builds {
            break;
        }
        if !visit(&run) {
            debug!(build = ?run.owner().map(|b| b.number), "trend target missing, stopping walk");
            break;
        }
        visited += 1;
        current = linker.previous_run(&run);
    }
}
