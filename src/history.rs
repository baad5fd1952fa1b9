//! Build history and cross-build linkage
//!
//! The host supplies builds and the results attached to them through
//! [`BuildHistory`]. [`HistoryLinker`] walks that history backward to find
//! the previous run and the same suite or case in it.

use crate::model::{CaseResult, SuiteResult, TestObject, TestRun};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A build of the host job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub number: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Build {
    pub fn new(number: u32, timestamp: DateTime<Utc>) -> Self {
        Build {
            number,
            timestamp,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name, `#<number>` when none was given.
    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.number))
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Access to the builds of a job and their results.
///
/// # Examples
///
/// ```
/// use robotrepo::history::{Build, BuildHistory, InMemoryHistory};
/// use robotrepo::model::{CaseResult, SuiteResult, TestRun};
///
/// let mut history = InMemoryHistory::new();
/// let mut suite = SuiteResult::new("Suite");
/// suite.add_case(CaseResult::passed("case"));
/// let mut run = TestRun::new();
/// run.add_suite(suite);
///
/// history.add(Build::new(1, chrono::Utc::now()), Some(run));
/// history.add(Build::new(2, chrono::Utc::now()), None);
///
/// assert_eq!(history.last_build().unwrap().number, 2);
/// assert!(history.result(2).is_none());
/// assert_eq!(history.result(1).unwrap().passed(), 1);
/// ```
pub trait BuildHistory {
    /// Build with the given number
    fn build(&self, number: u32) -> Option<Arc<Build>>;

    /// Nearest build with a lower number, with or without a result
    fn previous_build(&self, number: u32) -> Option<Arc<Build>>;

    /// Tallied result attached to a build
    fn result(&self, number: u32) -> Option<Arc<TestRun>>;

    /// Most recent build
    fn last_build(&self) -> Option<Arc<Build>>;
}

#[derive(Debug)]
struct Entry {
    build: Arc<Build>,
    result: Option<Arc<TestRun>>,
}

/// History held in memory, ordered by build number.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    entries: BTreeMap<u32, Entry>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a build and its result. The result is tallied against the build.
    ///
    /// A build with the same number replaces the earlier entry.
    pub fn add(&mut self, build: Build, result: Option<TestRun>) -> Arc<Build> {
        let build = Arc::new(build);
        let result = result.map(|mut run| {
            run.tally(Some(Arc::clone(&build)));
            Arc::new(run)
        });
        self.entries.insert(
            build.number,
            Entry {
                build: Arc::clone(&build),
                result,
            },
        );
        build
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds newest first
    pub fn builds(&self) -> impl Iterator<Item = &Arc<Build>> {
        self.entries.values().rev().map(|e| &e.build)
    }
}

impl BuildHistory for InMemoryHistory {
    fn build(&self, number: u32) -> Option<Arc<Build>> {
        self.entries.get(&number).map(|e| Arc::clone(&e.build))
    }

    fn previous_build(&self, number: u32) -> Option<Arc<Build>> {
        self.entries
            .range(..number)
            .next_back()
            .map(|(_, e)| Arc::clone(&e.build))
    }

    fn result(&self, number: u32) -> Option<Arc<TestRun>> {
        self.entries.get(&number).and_then(|e| e.result.clone())
    }

    fn last_build(&self) -> Option<Arc<Build>> {
        self.entries.values().next_back().map(|e| Arc::clone(&e.build))
    }
}

/// A suite or case found in an earlier run.
#[derive(Debug, Clone)]
pub struct Linked {
    run: Arc<TestRun>,
    path: String,
}

impl Linked {
    pub fn run(&self) -> &Arc<TestRun> {
        &self.run
    }

    /// Path of the object inside its run
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn object(&self) -> Option<TestObject<'_>> {
        self.run.find_by_path(&self.path)
    }

    pub fn case(&self) -> Option<&CaseResult> {
        self.object().and_then(|o| o.as_case())
    }

    pub fn suite(&self) -> Option<&SuiteResult> {
        self.object().and_then(|o| o.as_suite())
    }
}

/// Resolves previous runs and the same objects across runs.
pub struct HistoryLinker<'h, H: BuildHistory + ?Sized> {
    history: &'h H,
}

impl<'h, H: BuildHistory + ?Sized> HistoryLinker<'h, H> {
    pub fn new(history: &'h H) -> Self {
        HistoryLinker { history }
    }

    pub fn history(&self) -> &'h H {
        self.history
    }

    /// Result of the nearest earlier build that has one.
    ///
    /// Builds without results are skipped; numbering gaps are fine.
    pub fn previous_run_of(&self, number: u32) -> Option<Arc<TestRun>> {
        let mut current = number;
        while let Some(build) = self.history.previous_build(current) {
            if build.number >= current {
                // A history must only ever hand out strictly earlier builds.
                debug!(build = build.number, "history did not move backward");
                return None;
            }
            if let Some(run) = self.history.result(build.number) {
                return Some(run);
            }
            debug!(build = build.number, "skipping build without results");
            current = build.number;
        }
        None
    }

    /// Result preceding `run`, or none when `run` is not bound to a build.
    pub fn previous_run(&self, run: &TestRun) -> Option<Arc<TestRun>> {
        self.previous_run_of(run.owner()?.number)
    }

    /// Same suite in `run`, by path.
    pub fn resolve_suite<'r>(&self, run: &'r TestRun, path: &str) -> Option<&'r SuiteResult> {
        run.find_by_path(path).and_then(|o| o.as_suite())
    }

    /// Same case in `run`, by path.
    pub fn resolve_case<'r>(&self, run: &'r TestRun, path: &str) -> Option<&'r CaseResult> {
        run.find_by_path(path).and_then(|o| o.as_case())
    }

    fn link(&self, number: u32, path: String, want_case: bool) -> Option<Linked> {
        let run = self.previous_run_of(number)?;
        let found = match run.find_by_path(&path)? {
            TestObject::Case(_) => want_case,
            TestObject::Suite(_) => !want_case,
        };
        found.then_some(Linked { run, path })
    }

    /// The suite at the same path in the previous run.
    pub fn previous_suite(&self, suite: &SuiteResult) -> Option<Linked> {
        self.link(suite.owner()?.number, suite.id(), false)
    }

    /// The case at the same path in the previous run.
    pub fn previous_case(&self, case: &CaseResult) -> Option<Linked> {
        self.link(case.owner()?.number, case.id(), true)
    }
}
