//! Suite results (internal nodes of the result tree) and the tally algorithm

use crate::history::Build;
use crate::model::cache::{NodeLink, ParentRef};
use crate::model::case::CaseResult;
use crate::model::naming;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Aggregate counters of a suite or run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub critical_passed: u64,
    pub critical_failed: u64,
    /// Milliseconds
    pub duration: u64,
}

impl Totals {
    /// Passed plus failed; skipped cases are not part of the total.
    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }

    pub fn critical_total(&self) -> u64 {
        self.critical_passed + self.critical_failed
    }

    fn add_case(&mut self, case: &CaseResult) {
        if case.is_passed() {
            self.passed += 1;
            if case.is_critical() {
                self.critical_passed += 1;
            }
        } else if case.is_skipped() {
            self.skipped += 1;
        } else {
            self.failed += 1;
            if case.is_critical() {
                self.critical_failed += 1;
            }
        }
        self.duration += case.duration();
    }

    pub(crate) fn add(&mut self, other: &Totals) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.critical_passed += other.critical_passed;
        self.critical_failed += other.critical_failed;
        self.duration += other.duration;
    }

    /// Pass percentage truncated to one decimal.
    pub fn pass_percentage(&self, only_critical: bool, count_skipped: bool) -> f64 {
        if only_critical {
            pass_percentage(self.critical_passed, self.critical_failed, 0, false)
        } else {
            pass_percentage(self.passed, self.failed, self.skipped, count_skipped)
        }
    }
}

/// Percentage of passed cases, rounded down to one decimal place.
///
/// A scope with no cases counts as fully passing.
pub fn pass_percentage(passed: u64, failed: u64, skipped: u64, count_skipped: bool) -> f64 {
    let mut total = passed + failed;
    if count_skipped {
        total += skipped;
    }
    if total == 0 {
        return 100.0;
    }
    // Integer arithmetic keeps the truncation exact (57/100 is 57.0, not 56.9).
    (passed * 1000 / total) as f64 / 10.0
}

/// Result of a test suite, possibly containing nested suites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteResult {
    name: String,
    duplicate_safe_name: Option<String>,
    description: Option<String>,
    source: Option<String>,
    /// Elapsed time reported for the suite itself, in milliseconds.
    explicit_duration: Option<u64>,
    children: IndexMap<String, SuiteResult>,
    cases: IndexMap<String, CaseResult>,
    #[serde(skip)]
    totals: Totals,
    #[serde(skip)]
    link: NodeLink,
}

impl SuiteResult {
    /// Creates an empty suite with the given declared name.
    pub fn new(name: impl Into<String>) -> Self {
        SuiteResult {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the documentation
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the suite source path
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the suite's own elapsed time in milliseconds
    pub fn with_duration(mut self, millis: u64) -> Self {
        self.explicit_duration = Some(millis);
        self
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }

    pub(crate) fn set_explicit_duration(&mut self, millis: Option<u64>) {
        self.explicit_duration = millis;
    }

    /// Declared name, used for display
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of this suite among its siblings
    pub fn duplicate_safe_name(&self) -> &str {
        self.duplicate_safe_name.as_deref().unwrap_or(&self.name)
    }

    pub(crate) fn set_duplicate_safe_name(&mut self, key: String) {
        self.duplicate_safe_name = Some(key);
    }

    /// Older blobs carry no duplicate-safe name; the map key is the name then.
    pub(crate) fn fill_duplicate_safe_name(&mut self, key: &str) {
        if self.duplicate_safe_name.is_none() {
            self.duplicate_safe_name = Some(key.to_string());
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Adds a nested suite, renaming it if a sibling already uses its name.
    ///
    /// Returns the key the suite was stored under.
    pub fn add_child(&mut self, mut child: SuiteResult) -> String {
        let key = naming::duplicate_safe_key(&self.children, child.name());
        child.set_duplicate_safe_name(key.clone());
        child.relink(Some(self.as_parent()));
        self.children.insert(key.clone(), child);
        key
    }

    /// Adds a case, renaming it if a sibling already uses its name.
    ///
    /// Returns the key the case was stored under.
    pub fn add_case(&mut self, mut case: CaseResult) -> String {
        let key = naming::duplicate_safe_key(&self.cases, case.name());
        case.set_duplicate_safe_name(key.clone());
        case.attach(self.as_parent());
        self.cases.insert(key.clone(), case);
        key
    }

    /// Immediate child suite by duplicate-safe name
    pub fn suite(&self, key: &str) -> Option<&SuiteResult> {
        self.children.get(key)
    }

    /// Case by duplicate-safe name
    pub fn case(&self, key: &str) -> Option<&CaseResult> {
        self.cases.get(key)
    }

    pub fn child_suites(&self) -> impl Iterator<Item = &SuiteResult> {
        self.children.values()
    }

    pub fn cases(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.values()
    }

    /// All suites below this one, depth first
    pub fn all_child_suites(&self) -> Vec<&SuiteResult> {
        let mut out = Vec::new();
        for child in self.children.values() {
            out.push(child);
            out.extend(child.all_child_suites());
        }
        out
    }

    /// All cases in this suite and below, depth first
    pub fn all_cases(&self) -> Vec<&CaseResult> {
        let mut out: Vec<&CaseResult> = self.cases.values().collect();
        for child in self.children.values() {
            out.extend(child.all_cases());
        }
        out
    }

    /// All failed cases in this suite and below
    pub fn all_failed_cases(&self) -> Vec<&CaseResult> {
        self.all_cases()
            .into_iter()
            .filter(|c| c.is_failed())
            .collect()
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn passed(&self) -> u64 {
        self.totals.passed
    }

    pub fn failed(&self) -> u64 {
        self.totals.failed
    }

    pub fn skipped(&self) -> u64 {
        self.totals.skipped
    }

    pub fn critical_passed(&self) -> u64 {
        self.totals.critical_passed
    }

    pub fn critical_failed(&self) -> u64 {
        self.totals.critical_failed
    }

    /// Milliseconds; the suite's own elapsed time when the report has one.
    pub fn duration(&self) -> u64 {
        self.totals.duration
    }

    /// Escaped path of this suite from the run root
    pub fn id(&self) -> String {
        naming::child_path(
            self.link.parent.as_ref().map(|p| p.id.as_str()),
            self.duplicate_safe_name(),
        )
    }

    /// Dotted name including all enclosing suites
    pub fn full_name(&self) -> String {
        match &self.link.parent {
            Some(parent) if !parent.full_name.is_empty() => {
                format!("{}.{}", parent.full_name, self.name)
            }
            _ => self.name.clone(),
        }
    }

    /// Path of the enclosing suite, `None` for top-level suites
    pub fn parent_id(&self) -> Option<&str> {
        self.link.parent.as_ref().map(|p| p.id.as_str())
    }

    /// Build this suite was tallied under
    pub fn owner(&self) -> Option<&Build> {
        self.link.owner.as_deref()
    }

    /// Find a suite or case below this suite by raw keys.
    ///
    /// Each key is tried as given, then in its legacy sanitized form. A case
    /// shadows a child suite stored under the same key.
    pub(crate) fn resolve<'a>(&'a self, keys: &[String]) -> Option<super::TestObject<'a>> {
        let (first, rest) = keys.split_first()?;
        if rest.is_empty() {
            if let Some(case) = lookup(&self.cases, first) {
                return Some(super::TestObject::Case(case));
            }
            return lookup(&self.children, first).map(super::TestObject::Suite);
        }
        lookup(&self.children, first)?.resolve(rest)
    }

    fn as_parent(&self) -> ParentRef {
        ParentRef {
            id: self.id(),
            full_name: self.full_name(),
        }
    }

    /// Rebuild parent links of this subtree.
    pub(crate) fn relink(&mut self, parent: Option<ParentRef>) {
        self.link.parent = parent;
        let me = self.as_parent();
        for (key, case) in self.cases.iter_mut() {
            case.fill_duplicate_safe_name(key);
            case.attach(me.clone());
        }
        for (key, child) in self.children.iter_mut() {
            child.fill_duplicate_safe_name(key);
            child.relink(Some(me.clone()));
        }
    }

    /// Recompute counters from the cases and child suites, and bind the
    /// subtree to `owner`.
    pub fn tally(&mut self, owner: Option<&Arc<Build>>) {
        self.link.owner = owner.cloned();
        let mut totals = Totals::default();
        for case in self.cases.values_mut() {
            case.set_owner(owner);
            totals.add_case(case);
        }
        for child in self.children.values_mut() {
            child.tally(owner);
            totals.add(child.totals());
        }
        if let Some(explicit) = self.explicit_duration {
            totals.duration = explicit;
        }
        self.totals = totals;
    }
}

/// Look up `key` in a sibling map, falling back to its legacy sanitized form.
pub(crate) fn lookup<'a, V>(map: &'a IndexMap<String, V>, key: &str) -> Option<&'a V> {
    map.get(key)
        .or_else(|| map.get(&naming::legacy_safe_name(key)))
}
