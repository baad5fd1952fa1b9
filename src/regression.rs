//! Failure streak tracking for individual cases

use crate::history::{Build, BuildHistory, HistoryLinker, Linked};
use crate::model::CaseResult;
use std::sync::Arc;
use tracing::{debug, warn};

/// Computes since which build a case has been failing.
pub struct RegressionTracker<'h, H: BuildHistory + ?Sized> {
    linker: HistoryLinker<'h, H>,
}

impl<'h, H: BuildHistory + ?Sized> RegressionTracker<'h, H> {
    pub fn new(history: &'h H) -> Self {
        RegressionTracker {
            linker: HistoryLinker::new(history),
        }
    }

    /// First build of the unbroken failure streak ending at `case`.
    ///
    /// Returns 0 for passing or skipped cases and for cases that are not
    /// bound to a build. The value is memoized on every case of the streak.
    pub fn failed_since(&self, case: &CaseResult) -> u32 {
        if !case.is_failed() {
            return 0;
        }
        let Some(owner) = case.owner() else {
            warn!(case = %case.full_name(), "Case is not bound to a build, cannot track regression");
            return 0;
        };

        let mut guard = case.cache().lock();
        if *guard != 0 {
            return *guard;
        }

        let mut since = owner.number;
        let mut inherited = None;
        let mut walked: Vec<Linked> = Vec::new();
        let mut current = self.linker.previous_case(case);
        while let Some(linked) = current {
            let Some(previous) = linked.case() else {
                break;
            };
            if !previous.is_failed() {
                break;
            }
            if let Some(known) = previous.cache().failed_since() {
                inherited = Some(known);
                break;
            }
            let Some(number) = previous.owner().map(|b| b.number) else {
                break;
            };
            since = number;
            current = self.linker.previous_case(previous);
            walked.push(linked);
        }

        let since = inherited.unwrap_or(since);
        debug!(case = %case.full_name(), since, walked = walked.len(), "resolved failure streak");
        for linked in &walked {
            if let Some(previous) = linked.case() {
                previous.cache().store(since);
            }
        }
        *guard = since;
        since
    }

    /// Number of consecutive failing builds, counting the current one.
    pub fn age(&self, case: &CaseResult) -> u32 {
        if !case.is_failed() {
            return 0;
        }
        let Some(owner) = case.owner() else {
            return 0;
        };
        match self.failed_since(case) {
            0 => 0,
            since => owner.number.saturating_sub(since) + 1,
        }
    }

    /// Build in which the current failure streak started.
    pub fn failed_since_build(&self, case: &CaseResult) -> Option<Arc<Build>> {
        match self.failed_since(case) {
            0 => None,
            since => self.linker.history().build(since),
        }
    }
}
