//! Cross-build behaviour: linkage, failure streaks and trend series

use chrono::{TimeZone, Utc};
use robotrepo::history::{Build, BuildHistory, HistoryLinker, InMemoryHistory};
use robotrepo::model::{pass_percentage, CaseResult, CaseStatus, SuiteResult, TestRun};
use robotrepo::regression::RegressionTracker;
use robotrepo::trend::{
    duration_series, outcome_series, BuildLabel, Category, TimeScale, TrendOptions, TrendTarget,
};

fn build(number: u32) -> Build {
    Build::new(number, Utc.with_ymd_and_hms(2024, 5, number, 8, 30, 0).unwrap())
}

fn case(name: &str, status: CaseStatus, millis: u64) -> CaseResult {
    let case = match status {
        CaseStatus::Failed => CaseResult::failed(name, "boom"),
        other => CaseResult::passed(name).with_outcome(other),
    };
    case.with_duration(millis)
}

/// Root suite with a nested suite, so paths have more than one level.
fn run_of(cases: &[(&str, CaseStatus, u64)]) -> TestRun {
    let mut inner = SuiteResult::new("Inner");
    for (name, status, millis) in cases {
        inner.add_case(case(name, *status, *millis));
    }
    let mut root = SuiteResult::new("Root");
    root.add_child(inner);
    let mut run = TestRun::new();
    run.add_suite(root);
    run
}

fn history_of(runs: Vec<Option<TestRun>>) -> InMemoryHistory {
    let mut history = InMemoryHistory::new();
    for (i, run) in runs.into_iter().enumerate() {
        history.add(build(i as u32 + 1), run);
    }
    history
}

fn latest(history: &InMemoryHistory) -> std::sync::Arc<TestRun> {
    let last = history.last_build().unwrap();
    history.result(last.number).unwrap()
}

#[test]
fn test_run_totals_equal_sum_of_suites() {
    let mut first = SuiteResult::new("First");
    first.add_case(case("a", CaseStatus::Passed, 10));
    first.add_case(case("b", CaseStatus::Failed, 10));
    let mut nested = SuiteResult::new("Nested");
    nested.add_case(case("c", CaseStatus::Skipped, 0));
    nested.add_case(case("d", CaseStatus::Failed, 5));
    first.add_child(nested);
    let mut second = SuiteResult::new("Second");
    second.add_case(case("e", CaseStatus::Passed, 1));

    let mut run = TestRun::new();
    run.add_suite(first);
    run.add_suite(second);
    run.tally(None);

    let suite_sum: u64 = run
        .suites()
        .map(|s| s.passed() + s.failed() + s.skipped())
        .sum();
    assert_eq!(run.passed() + run.failed() + run.skipped(), suite_sum);
    assert_eq!(suite_sum, 5);

    let first = run.suite("First").unwrap();
    let direct_failures = first.cases().filter(|c| c.is_failed()).count() as u64;
    let child_failures: u64 = first.child_suites().map(|c| c.failed()).sum();
    assert_eq!(first.failed(), direct_failures + child_failures);
    assert_eq!(run.duration(), 26);

    let before = *run.totals();
    run.tally(None);
    assert_eq!(*run.totals(), before);
}

#[test]
fn test_duplicate_safe_keys() {
    let mut suite = SuiteResult::new("S");
    assert_eq!(suite.add_case(CaseResult::passed("X")), "X");
    assert_eq!(suite.add_case(CaseResult::passed("X")), "X_1");
    assert_eq!(suite.add_case(CaseResult::passed("X")), "X_2");
    assert_eq!(suite.case("X_2").unwrap().name(), "X");
}

#[test]
fn test_pass_percentage_truncates() {
    assert_eq!(pass_percentage(2, 1, 0, false), 66.6);
    assert_eq!(pass_percentage(0, 0, 0, false), 100.0);
    assert_eq!(pass_percentage(0, 0, 4, false), 100.0);
    assert_eq!(pass_percentage(0, 0, 4, true), 0.0);
}

#[test]
fn test_linker_finds_nearest_build_with_result() {
    let history = history_of(vec![
        Some(run_of(&[("a", CaseStatus::Passed, 1)])),
        None,
        None,
        Some(run_of(&[("a", CaseStatus::Failed, 1)])),
    ]);
    let linker = HistoryLinker::new(&history);
    let current = latest(&history);

    let previous = linker.previous_run(&current).unwrap();
    assert_eq!(previous.owner().unwrap().number, 1);

    let case = linker.resolve_case(&current, "Root/Inner/a").unwrap();
    let linked = linker.previous_case(case).unwrap();
    assert_eq!(linked.path(), "Root/Inner/a");
    assert!(linked.case().unwrap().is_passed());
}

#[test]
fn test_linker_renamed_case_is_not_found() {
    let history = history_of(vec![
        Some(run_of(&[("old", CaseStatus::Failed, 1)])),
        Some(run_of(&[("new", CaseStatus::Failed, 1)])),
    ]);
    let linker = HistoryLinker::new(&history);
    let current = latest(&history);
    let case = linker.resolve_case(&current, "Root/Inner/new").unwrap();
    assert!(linker.previous_case(case).is_none());

    let tracker = RegressionTracker::new(&history);
    assert_eq!(tracker.failed_since(case), 2);
    assert_eq!(tracker.age(case), 1);
}

#[test]
fn test_regression_three_builds() {
    let history = history_of(vec![
        Some(run_of(&[("t", CaseStatus::Passed, 1)])),
        Some(run_of(&[("t", CaseStatus::Failed, 1)])),
        Some(run_of(&[("t", CaseStatus::Failed, 1)])),
    ]);
    let tracker = RegressionTracker::new(&history);
    let current = latest(&history);
    let case = current.find_by_path("Root/Inner/t").unwrap().as_case().unwrap();

    assert_eq!(tracker.failed_since(case), 2);
    assert_eq!(tracker.age(case), 2);
}

#[test]
fn test_regression_skip_breaks_streak() {
    let history = history_of(vec![
        Some(run_of(&[("t", CaseStatus::Failed, 1)])),
        Some(run_of(&[("t", CaseStatus::Skipped, 1)])),
        Some(run_of(&[("t", CaseStatus::Failed, 1)])),
    ]);
    let tracker = RegressionTracker::new(&history);
    let current = latest(&history);
    let case = current.find_by_path("Root/Inner/t").unwrap().as_case().unwrap();
    assert_eq!(tracker.failed_since(case), 3);
}

#[test]
fn test_regression_across_gaps_and_threads() {
    let history = history_of(vec![
        Some(run_of(&[("t", CaseStatus::Passed, 1)])),
        Some(run_of(&[("t", CaseStatus::Failed, 1)])),
        None,
        Some(run_of(&[("t", CaseStatus::Failed, 1)])),
        Some(run_of(&[("t", CaseStatus::Failed, 1)])),
    ]);
    let tracker = RegressionTracker::new(&history);

    let results: Vec<u32> = std::thread::scope(|scope| {
        let handles: Vec<_> = [5u32, 4, 2]
            .into_iter()
            .map(|number| {
                let tracker = &tracker;
                let history = &history;
                scope.spawn(move || {
                    let run = history.result(number).unwrap();
                    let case = run.find_by_path("Root/Inner/t").unwrap().as_case().unwrap();
                    tracker.failed_since(case)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, vec![2, 2, 2]);

    let run = history.result(5).unwrap();
    let case = run.find_by_path("Root/Inner/t").unwrap().as_case().unwrap();
    assert_eq!(tracker.age(case), 4);
    assert_eq!(tracker.failed_since_build(case).unwrap().number, 2);
}

fn five_builds() -> InMemoryHistory {
    history_of(
        (1..=5)
            .map(|i| {
                Some(run_of(&[
                    ("a", CaseStatus::Passed, 100),
                    ("b", if i % 2 == 0 { CaseStatus::Failed } else { CaseStatus::Passed }, 100),
                    ("c", CaseStatus::Skipped, 0),
                ]))
            })
            .collect(),
    )
}

#[test]
fn test_walk_respects_max_builds() {
    let history = five_builds();
    let start = latest(&history);

    let one = TrendOptions {
        max_builds_to_show: 1,
        ..TrendOptions::default()
    };
    let series = outcome_series(&history, &start, &TrendTarget::Run, &one);
    assert_eq!(series.labels().len(), 1);
    assert_eq!(series.labels()[0].text, "#5");

    let all = TrendOptions::default();
    let series = outcome_series(&history, &start, &TrendTarget::Run, &all);
    let labels: Vec<String> = series.labels().iter().map(|l| l.text.clone()).collect();
    assert_eq!(labels, vec!["#1", "#2", "#3", "#4", "#5"]);
    assert_eq!(series.values(Category::Failed), vec![0, 1, 0, 1, 0]);
    assert_eq!(series.values(Category::Skipped), vec![1, 1, 1, 1, 1]);
}

#[test]
fn test_outcome_bounds() {
    let history = five_builds();
    let start = latest(&history);

    let options = TrendOptions {
        significant_data: true,
        ..TrendOptions::default()
    };
    let series = outcome_series(&history, &start, &TrendTarget::Run, &options);
    // passed ranges over 1..=2, passed + failed is always 2
    assert_eq!(series.lower_bound, Some(0.95));
    assert_eq!(series.upper_bound, Some(2.1));

    let failures = TrendOptions {
        significant_data: true,
        failures_only: true,
        ..TrendOptions::default()
    };
    let series = outcome_series(&history, &start, &TrendTarget::Run, &failures);
    assert_eq!(series.values(Category::Passed), vec![0; 5]);
    assert_eq!(series.values(Category::Skipped), vec![0; 5]);
    assert_eq!(series.lower_bound, Some(0.0));
    assert_eq!(series.upper_bound, Some(1.05));
}

#[test]
fn test_outcome_critical_only() {
    let mut suite = SuiteResult::new("Root");
    suite.add_case(CaseResult::passed("crit"));
    suite.add_case(CaseResult::failed("minor", "x").with_critical(false));
    let mut run = TestRun::new();
    run.add_suite(suite);
    let history = history_of(vec![Some(run)]);
    let start = latest(&history);

    let options = TrendOptions {
        critical_only: true,
        ..TrendOptions::default()
    };
    let series = outcome_series(&history, &start, &TrendTarget::Run, &options);
    assert_eq!(series.values(Category::Passed), vec![1]);
    assert_eq!(series.values(Category::Failed), vec![0]);

    let case_target = TrendTarget::for_path(&start, "Root/minor").unwrap();
    let series = outcome_series(&history, &start, &case_target, &options);
    assert_eq!(series.values(Category::Failed), vec![0]);
}

#[test]
fn test_suite_trend_stops_where_suite_is_missing() {
    let mut old = TestRun::new();
    old.add_suite(SuiteResult::new("Other"));
    let history = history_of(vec![
        Some(run_of(&[("a", CaseStatus::Passed, 1)])),
        Some(old),
        Some(run_of(&[("a", CaseStatus::Passed, 1)])),
    ]);
    let start = latest(&history);
    let target = TrendTarget::for_path(&start, "Root/Inner").unwrap();
    assert_eq!(target, TrendTarget::Suite("Root/Inner".to_string()));

    let series = outcome_series(&history, &start, &target, &TrendOptions::default());
    assert_eq!(series.labels().len(), 1);
}

#[test]
fn test_duration_series_minute_scale() {
    let history = history_of(vec![
        Some(run_of(&[("a", CaseStatus::Passed, 500)])),
        Some(run_of(&[("a", CaseStatus::Passed, 1500)])),
        Some(run_of(&[("a", CaseStatus::Passed, 61000)])),
    ]);
    let start = latest(&history);
    let series = duration_series(&history, &start, &TrendTarget::Run, &TrendOptions::default());

    assert_eq!(series.scale, TimeScale::Minutes);
    assert_eq!(series.scale.divisor(), 60_000);
    assert_eq!(series.unit(), "min");
    let values: Vec<f64> = series.points.iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![500.0 / 60_000.0, 0.025, 61_000.0 / 60_000.0]);
}

#[test]
fn test_duration_series_of_case() {
    let history = history_of(vec![
        Some(run_of(&[("a", CaseStatus::Passed, 200), ("b", CaseStatus::Passed, 900)])),
        Some(run_of(&[("a", CaseStatus::Passed, 400), ("b", CaseStatus::Passed, 900)])),
    ]);
    let start = latest(&history);
    let target = TrendTarget::for_path(&start, "Root/Inner/a").unwrap();
    let series = duration_series(&history, &start, &target, &TrendOptions::default());

    assert_eq!(series.scale, TimeScale::Milliseconds);
    assert_eq!(series.points.len(), 2);
    assert_eq!(series.points[0].1, 200.0);
    assert_eq!(series.points[1].1, 400.0);
}

#[test]
fn test_label_formats() {
    let b = build(3);
    assert_eq!(BuildLabel::new(&b, "#$build").text, "#3");
    assert_eq!(BuildLabel::new(&b, "$build %d.%m.").text, "3 03.05.");
    assert_eq!(
        BuildLabel::new(&b.clone().with_display_name("rc 5%"), "$display_name").text,
        "rc 5%"
    );

    let mut labels = vec![BuildLabel::new(&build(10), "#$build"), BuildLabel::new(&build(9), "#$build")];
    labels.sort();
    assert_eq!(labels[0].text, "#9");
}
