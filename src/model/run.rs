//! The result tree root: one `TestRun` per build

use crate::history::Build;
use crate::model::case::CaseResult;
use crate::model::naming;
use crate::model::ordering::compare_cases;
use crate::model::suite::{self, SuiteResult, Totals};
use crate::model::TestObject;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pass/fail counts for one statistics category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub label: Option<String>,
    pub pass: u64,
    pub fail: u64,
    pub skip: u64,
}

impl Stat {
    pub fn new(label: impl Into<String>, pass: u64, fail: u64) -> Self {
        Stat {
            label: Some(label.into()),
            pass,
            fail,
            skip: 0,
        }
    }
}

/// Where a run's aggregate statistics come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunStatistics<'a> {
    /// Category pair carried by older persisted runs: critical tests, then all tests.
    Legacy { critical: &'a Stat, all: &'a Stat },
    /// Counters recomputed by the last tally.
    Recomputed(&'a Totals),
}

impl RunStatistics<'_> {
    pub fn is_legacy(&self) -> bool {
        matches!(self, RunStatistics::Legacy { .. })
    }

    pub fn passed(&self) -> u64 {
        match self {
            RunStatistics::Legacy { all, .. } => all.pass,
            RunStatistics::Recomputed(t) => t.passed,
        }
    }

    pub fn failed(&self) -> u64 {
        match self {
            RunStatistics::Legacy { all, .. } => all.fail,
            RunStatistics::Recomputed(t) => t.failed,
        }
    }

    pub fn skipped(&self) -> u64 {
        match self {
            RunStatistics::Legacy { all, .. } => all.skip,
            RunStatistics::Recomputed(t) => t.skipped,
        }
    }

    pub fn critical_passed(&self) -> u64 {
        match self {
            RunStatistics::Legacy { critical, .. } => critical.pass,
            RunStatistics::Recomputed(t) => t.critical_passed,
        }
    }

    pub fn critical_failed(&self) -> u64 {
        match self {
            RunStatistics::Legacy { critical, .. } => critical.fail,
            RunStatistics::Recomputed(t) => t.critical_failed,
        }
    }
}

/// Pick the authoritative statistics for a run.
///
/// A present, non-empty legacy list always wins over the recomputed counters.
/// Its first entry holds the critical tests; the second, when there is one,
/// all tests.
pub fn resolve_statistics<'a>(legacy: Option<&'a [Stat]>, totals: &'a Totals) -> RunStatistics<'a> {
    match legacy {
        Some([critical, all, ..]) => RunStatistics::Legacy { critical, all },
        Some([only]) => RunStatistics::Legacy {
            critical: only,
            all: only,
        },
        _ => RunStatistics::Recomputed(totals),
    }
}

/// Parsed results of one build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRun {
    /// Generation time as written by the runner.
    timestamp: Option<String>,
    suites: IndexMap<String, SuiteResult>,
    /// `<statistics>/<total>` entries of the report, informational only.
    report_statistics: Vec<Stat>,
    #[serde(rename = "overall_stats", skip_serializing_if = "Option::is_none")]
    legacy_stats: Option<Vec<Stat>>,
    #[serde(skip)]
    totals: Totals,
    #[serde(skip)]
    owner: Option<Arc<Build>>,
}

impl TestRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Attach a legacy category pair, as older persisted runs carry.
    pub fn with_legacy_stats(mut self, stats: Vec<Stat>) -> Self {
        self.legacy_stats = Some(stats);
        self
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: String) {
        self.timestamp = Some(timestamp);
    }

    pub fn report_statistics(&self) -> &[Stat] {
        &self.report_statistics
    }

    pub(crate) fn set_report_statistics(&mut self, stats: Vec<Stat>) {
        self.report_statistics = stats;
    }

    /// Adds a top-level suite, renaming it on collision.
    ///
    /// Returns the key the suite was stored under.
    pub fn add_suite(&mut self, mut suite: SuiteResult) -> String {
        let key = naming::duplicate_safe_key(&self.suites, suite.name());
        suite.set_duplicate_safe_name(key.clone());
        suite.relink(None);
        self.suites.insert(key.clone(), suite);
        key
    }

    /// Top-level suite by duplicate-safe name
    pub fn suite(&self, key: &str) -> Option<&SuiteResult> {
        suite::lookup(&self.suites, key)
    }

    pub fn suites(&self) -> impl Iterator<Item = &SuiteResult> {
        self.suites.values()
    }

    pub(crate) fn into_suites(self) -> impl Iterator<Item = SuiteResult> {
        self.suites.into_values()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Recompute all counters and bind the tree to `owner`.
    pub fn tally(&mut self, owner: Option<Arc<Build>>) {
        let mut totals = Totals::default();
        for (key, suite) in self.suites.iter_mut() {
            suite.fill_duplicate_safe_name(key);
            suite.relink(None);
            suite.tally(owner.as_ref());
            totals.add(suite.totals());
        }
        self.totals = totals;
        self.owner = owner;
    }

    /// Build this run was tallied under
    pub fn owner(&self) -> Option<&Build> {
        self.owner.as_deref()
    }

    /// Counters from the last tally, ignoring any legacy statistics.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Authoritative statistics; see [`resolve_statistics`].
    pub fn statistics(&self) -> RunStatistics<'_> {
        resolve_statistics(self.legacy_stats.as_deref(), &self.totals)
    }

    pub fn passed(&self) -> u64 {
        self.statistics().passed()
    }

    pub fn failed(&self) -> u64 {
        self.statistics().failed()
    }

    pub fn skipped(&self) -> u64 {
        self.statistics().skipped()
    }

    pub fn critical_passed(&self) -> u64 {
        self.statistics().critical_passed()
    }

    pub fn critical_failed(&self) -> u64 {
        self.statistics().critical_failed()
    }

    /// Passed plus failed
    pub fn total(&self) -> u64 {
        self.passed() + self.failed()
    }

    pub fn critical_total(&self) -> u64 {
        self.critical_passed() + self.critical_failed()
    }

    /// Milliseconds, summed over the top-level suites.
    pub fn duration(&self) -> u64 {
        self.totals.duration
    }

    /// Pass percentage truncated to one decimal; 100 for an empty scope.
    pub fn pass_percentage(&self, only_critical: bool, count_skipped: bool) -> f64 {
        let stats = self.statistics();
        if only_critical {
            suite::pass_percentage(stats.critical_passed(), stats.critical_failed(), 0, false)
        } else {
            suite::pass_percentage(stats.passed(), stats.failed(), stats.skipped(), count_skipped)
        }
    }

    /// "passed / total" for display
    pub fn pass_ratio(&self) -> String {
        format!("{} / {}", self.passed(), self.total())
    }

    /// Find a suite or case by its `/`-separated path of duplicate-safe names.
    pub fn find_by_path(&self, path: &str) -> Option<TestObject<'_>> {
        let keys = naming::split_path(path);
        let (first, rest) = keys.split_first()?;
        let suite = self.suite(first)?;
        if rest.is_empty() {
            Some(TestObject::Suite(suite))
        } else {
            suite.resolve(rest)
        }
    }

    /// Every suite at any depth, depth first
    pub fn all_suites(&self) -> Vec<&SuiteResult> {
        let mut out = Vec::new();
        for suite in self.suites.values() {
            out.push(suite);
            out.extend(suite.all_child_suites());
        }
        out
    }

    /// Every case at any depth, in document order
    pub fn all_cases(&self) -> Vec<&CaseResult> {
        self.suites.values().flat_map(|s| s.all_cases()).collect()
    }

    fn sorted_cases(&self, keep: impl Fn(&CaseResult) -> bool) -> Vec<&CaseResult> {
        let mut cases: Vec<_> = self.all_cases().into_iter().filter(|c| keep(c)).collect();
        cases.sort_by(|a, b| compare_cases(a, b));
        cases
    }

    pub fn failed_cases(&self) -> Vec<&CaseResult> {
        self.sorted_cases(CaseResult::is_failed)
    }

    pub fn passed_cases(&self) -> Vec<&CaseResult> {
        self.sorted_cases(CaseResult::is_passed)
    }

    pub fn skipped_cases(&self) -> Vec<&CaseResult> {
        self.sorted_cases(CaseResult::is_skipped)
    }

    pub fn critical_failed_cases(&self) -> Vec<&CaseResult> {
        self.sorted_cases(|c| c.is_failed() && c.is_critical())
    }
}
