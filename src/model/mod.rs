//! Hierarchical result model
//!
//! A [`TestRun`] owns its top-level suites, which own nested suites and
//! cases. Children refer to their parent only by path, and the counters are
//! recomputed from the leaves by [`TestRun::tally`].

pub mod cache;
pub mod case;
pub mod naming;
pub mod ordering;
pub mod run;
pub mod suite;

pub use case::{CaseResult, CaseStatus};
pub use ordering::compare_cases;
pub use run::{resolve_statistics, RunStatistics, Stat, TestRun};
pub use suite::{pass_percentage, SuiteResult, Totals};

/// A node found by path: either a suite or a case.
#[derive(Debug, Clone, Copy)]
pub enum TestObject<'a> {
    Suite(&'a SuiteResult),
    Case(&'a CaseResult),
}

impl<'a> TestObject<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            TestObject::Suite(s) => s.name(),
            TestObject::Case(c) => c.name(),
        }
    }

    pub fn id(&self) -> String {
        match self {
            TestObject::Suite(s) => s.id(),
            TestObject::Case(c) => c.id(),
        }
    }

    pub fn full_name(&self) -> String {
        match self {
            TestObject::Suite(s) => s.full_name(),
            TestObject::Case(c) => c.full_name(),
        }
    }

    /// Milliseconds
    pub fn duration(&self) -> u64 {
        match self {
            TestObject::Suite(s) => s.duration(),
            TestObject::Case(c) => c.duration(),
        }
    }

    pub fn as_suite(&self) -> Option<&'a SuiteResult> {
        match self {
            TestObject::Suite(s) => Some(s),
            TestObject::Case(_) => None,
        }
    }

    pub fn as_case(&self) -> Option<&'a CaseResult> {
        match self {
            TestObject::Case(c) => Some(c),
            TestObject::Suite(_) => None,
        }
    }
}
