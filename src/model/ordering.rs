//! Display order of cases in failure listings

use crate::model::case::{CaseResult, CaseStatus};
use std::cmp::Ordering;

fn rank(status: CaseStatus) -> u8 {
    match status {
        CaseStatus::Failed => 0,
        CaseStatus::Skipped => 1,
        CaseStatus::Passed => 2,
    }
}

/// Failures first, critical failures before non-critical ones, then by
/// full dotted name.
pub fn compare_cases(a: &CaseResult, b: &CaseResult) -> Ordering {
    rank(a.status())
        .cmp(&rank(b.status()))
        .then_with(|| {
            if a.is_failed() && b.is_failed() {
                b.is_critical().cmp(&a.is_critical())
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.full_name().cmp(&b.full_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_come_first() {
        let failed = CaseResult::failed("b", "x");
        let passed = CaseResult::passed("a");
        let skipped = CaseResult::skipped("c");
        assert_eq!(compare_cases(&failed, &passed), Ordering::Less);
        assert_eq!(compare_cases(&skipped, &passed), Ordering::Less);
        assert_eq!(compare_cases(&failed, &skipped), Ordering::Less);
    }

    #[test]
    fn test_noncritical_failures_sort_after_critical() {
        let critical = CaseResult::failed("z", "x");
        let noncritical = CaseResult::failed("a", "x").with_critical(false);
        assert_eq!(compare_cases(&critical, &noncritical), Ordering::Less);
    }

    #[test]
    fn test_ties_break_on_name() {
        let a = CaseResult::passed("alpha");
        let b = CaseResult::passed("beta");
        assert_eq!(compare_cases(&a, &b), Ordering::Less);
        assert_eq!(compare_cases(&a, &a), Ordering::Equal);
    }
}
