//! Passed/failed/skipped trend

use crate::history::BuildHistory;
use crate::model::TestRun;
use crate::trend::{walk_history, BuildLabel, TrendOptions, TrendTarget};
use std::fmt;

/// Padding applied to explicit axis bounds.
const BOUND_PADDING: f64 = 0.05;

/// Row of the outcome chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Passed,
    Failed,
    Skipped,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Passed, Category::Failed, Category::Skipped];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Passed => write!(f, "Passed"),
            Category::Failed => write!(f, "Failed"),
            Category::Skipped => write!(f, "Skipped"),
        }
    }
}

/// One value of the outcome chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub category: Category,
    pub label: BuildLabel,
    pub value: u64,
}

/// Outcome trend, oldest build first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeSeries {
    pub points: Vec<DataPoint>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl OutcomeSeries {
    /// Distinct build labels in ascending build order
    pub fn labels(&self) -> Vec<&BuildLabel> {
        let mut labels: Vec<&BuildLabel> = self.points.iter().map(|p| &p.label).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Values of one category, oldest build first
    pub fn values(&self, category: Category) -> Vec<u64> {
        self.points
            .iter()
            .filter(|p| p.category == category)
            .map(|p| p.value)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    passed: u64,
    failed: u64,
    skipped: u64,
}

fn counts(run: &TestRun, target: &TrendTarget, critical_only: bool) -> Option<Counts> {
    let counts = match target {
        TrendTarget::Run => {
            let stats = run.statistics();
            if critical_only {
                Counts {
                    passed: stats.critical_passed(),
                    failed: stats.critical_failed(),
                    skipped: stats.skipped(),
                }
            } else {
                Counts {
                    passed: stats.passed(),
                    failed: stats.failed(),
                    skipped: stats.skipped(),
                }
            }
        }
        TrendTarget::Suite(path) | TrendTarget::Case(path) => {
            let object = run.find_by_path(path)?;
            if let Some(suite) = object.as_suite() {
                let totals = suite.totals();
                if critical_only {
                    Counts {
                        passed: totals.critical_passed,
                        failed: totals.critical_failed,
                        skipped: totals.skipped,
                    }
                } else {
                    Counts {
                        passed: totals.passed,
                        failed: totals.failed,
                        skipped: totals.skipped,
                    }
                }
            } else {
                let case = object.as_case()?;
                let counted = !critical_only || case.is_critical();
                Counts {
                    passed: (counted && case.is_passed()) as u64,
                    failed: (counted && case.is_failed()) as u64,
                    skipped: case.is_skipped() as u64,
                }
            }
        }
    };
    Some(counts)
}

/// Build the outcome trend for `target`, starting at `start`.
pub fn outcome_series<H: BuildHistory + ?Sized>(
    history: &H,
    start: &TestRun,
    target: &TrendTarget,
    options: &TrendOptions,
) -> OutcomeSeries {
    let mut points = Vec::new();
    let mut lowest: Option<u64> = None;
    let mut highest: Option<u64> = None;

    walk_history(history, start, options.max_builds_to_show, |run| {
        let Some(mut c) = counts(run, target, options.critical_only) else {
            return false;
        };
        if options.failures_only {
            c.passed = 0;
            c.skipped = 0;
        }
        let Some(build) = run.owner() else {
            return false;
        };
        let label = BuildLabel::new(build, &options.label_format);

        let compared = if options.failures_only { c.failed } else { c.passed };
        lowest = Some(lowest.map_or(compared, |l| l.min(compared)));
        let sum = c.failed + c.passed;
        highest = Some(highest.map_or(sum, |h| h.max(sum)));

        for (category, value) in [
            (Category::Passed, c.passed),
            (Category::Failed, c.failed),
            (Category::Skipped, c.skipped),
        ] {
            points.push(DataPoint {
                category,
                label: label.clone(),
                value,
            });
        }
        true
    });

    points.sort_by(|a, b| a.label.cmp(&b.label).then(a.category.cmp(&b.category)));

    let (lower_bound, upper_bound) = match (options.significant_data, lowest, highest) {
        (true, Some(low), Some(high)) => {
            let low = low as f64;
            let high = high as f64;
            (
                Some((low - low * BOUND_PADDING).max(0.0)),
                Some(high + high * BOUND_PADDING),
            )
        }
        _ => (None, None),
    };

    OutcomeSeries {
        points,
        lower_bound,
        upper_bound,
    }
}
