//! Duration trend with a shared time unit

use crate::history::BuildHistory;
use crate::model::TestRun;
use crate::trend::{walk_history, BuildLabel, TrendOptions, TrendTarget};
use std::fmt;

const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Unit all values of a duration series are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeScale {
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl TimeScale {
    /// Scale for a series whose largest value is `max_millis`.
    pub fn for_max(max_millis: u64) -> Self {
        if max_millis > HOUR {
            TimeScale::Hours
        } else if max_millis > MINUTE {
            TimeScale::Minutes
        } else if max_millis > SECOND {
            TimeScale::Seconds
        } else {
            TimeScale::Milliseconds
        }
    }

    /// Milliseconds per unit
    pub fn divisor(&self) -> u64 {
        match self {
            TimeScale::Hours => HOUR,
            TimeScale::Minutes => MINUTE,
            TimeScale::Seconds => SECOND,
            TimeScale::Milliseconds => 1,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            TimeScale::Hours => "h",
            TimeScale::Minutes => "min",
            TimeScale::Seconds => "s",
            TimeScale::Milliseconds => "ms",
        }
    }

    pub fn scale(&self, millis: u64) -> f64 {
        millis as f64 / self.divisor() as f64
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.unit())
    }
}

/// Duration trend, oldest build first, values already scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationSeries {
    pub points: Vec<(BuildLabel, f64)>,
    pub scale: TimeScale,
}

impl DurationSeries {
    /// Axis label unit
    pub fn unit(&self) -> &'static str {
        self.scale.unit()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn duration_of(run: &TestRun, target: &TrendTarget) -> Option<u64> {
    match target {
        TrendTarget::Run => Some(run.duration()),
        TrendTarget::Suite(path) | TrendTarget::Case(path) => {
            run.find_by_path(path).map(|o| o.duration())
        }
    }
}

/// Build the duration trend for `target`, starting at `start`.
pub fn duration_series<H: BuildHistory + ?Sized>(
    history: &H,
    start: &TestRun,
    target: &TrendTarget,
    options: &TrendOptions,
) -> DurationSeries {
    let mut raw = Vec::new();
    walk_history(history, start, options.max_builds_to_show, |run| {
        let (Some(build), Some(millis)) = (run.owner(), duration_of(run, target)) else {
            return false;
        };
        raw.push((BuildLabel::new(build, &options.label_format), millis));
        true
    });
    raw.sort_by(|a, b| a.0.cmp(&b.0));

    let max = raw.iter().map(|(_, millis)| *millis).max().unwrap_or(0);
    let scale = TimeScale::for_max(max);
    DurationSeries {
        points: raw
            .into_iter()
            .map(|(label, millis)| (label, scale.scale(millis)))
            .collect(),
        scale,
    }
}
