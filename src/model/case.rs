//! Test case results (leaves of the result tree)

use crate::history::Build;
use crate::model::cache::{CaseCache, NodeLink, ParentRef};
use crate::model::naming;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Timestamp layouts written by the runner, oldest first.
const TIMESTAMP_FORMATS: &[&str] = &["%Y%m%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Passed => write!(f, "PASS"),
            CaseStatus::Failed => write!(f, "FAIL"),
            CaseStatus::Skipped => write!(f, "SKIP"),
        }
    }
}

/// Result of a single test case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseResult {
    name: String,
    duplicate_safe_name: Option<String>,
    description: Option<String>,
    passed: bool,
    skipped: bool,
    critical: bool,
    start_time: Option<String>,
    end_time: Option<String>,
    /// Elapsed time in milliseconds.
    duration: u64,
    tags: Vec<String>,
    error_msg: Option<String>,
    stack_trace: Option<String>,
    #[serde(rename = "failed_since")]
    cache: CaseCache,
    #[serde(skip)]
    link: NodeLink,
}

impl CaseResult {
    fn with_status(name: impl Into<String>, passed: bool, skipped: bool) -> Self {
        CaseResult {
            name: name.into(),
            passed,
            skipped,
            critical: true,
            ..Default::default()
        }
    }

    /// Create a passing case
    pub fn passed(name: impl Into<String>) -> Self {
        Self::with_status(name, true, false)
    }

    /// Create a failing case
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut case = Self::with_status(name, false, false);
        case.error_msg = Some(message.into());
        case
    }

    /// Create a skipped case
    pub fn skipped(name: impl Into<String>) -> Self {
        Self::with_status(name, false, true)
    }

    /// Set the outcome
    pub fn with_outcome(mut self, status: CaseStatus) -> Self {
        self.passed = status == CaseStatus::Passed;
        self.skipped = status == CaseStatus::Skipped;
        self
    }

    /// Set the documentation
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the case critical or non-critical
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the error message
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_msg = Some(message.into());
        self
    }

    /// Set the execution narrative
    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }

    /// Set a precomputed duration in milliseconds
    pub fn with_duration(mut self, millis: u64) -> Self {
        self.duration = millis;
        self
    }

    /// Set start and end timestamps; the duration is derived from them.
    ///
    /// Timestamps that cannot be parsed give a zero duration.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        let start = start.into();
        let end = end.into();
        self.duration = match time_difference(&start, &end) {
            Some(millis) => millis,
            None => {
                warn!(
                    case = %self.name,
                    start = %start,
                    end = %end,
                    "Unable to parse testcase start and end times"
                );
                0
            }
        };
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Declared name, used for display
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of this case among its siblings
    pub fn duplicate_safe_name(&self) -> &str {
        self.duplicate_safe_name.as_deref().unwrap_or(&self.name)
    }

    pub(crate) fn set_duplicate_safe_name(&mut self, key: String) {
        self.duplicate_safe_name = Some(key);
    }

    pub(crate) fn fill_duplicate_safe_name(&mut self, key: &str) {
        if self.duplicate_safe_name.is_none() {
            self.duplicate_safe_name = Some(key.to_string());
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> CaseStatus {
        if self.passed {
            CaseStatus::Passed
        } else if self.skipped {
            CaseStatus::Skipped
        } else {
            CaseStatus::Failed
        }
    }

    pub fn is_passed(&self) -> bool {
        self.passed
    }

    pub fn is_skipped(&self) -> bool {
        !self.passed && self.skipped
    }

    /// True when the case neither passed nor was skipped.
    pub fn is_failed(&self) -> bool {
        !self.passed && !self.skipped
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Elapsed time in milliseconds
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn start_time(&self) -> Option<&str> {
        self.start_time.as_deref()
    }

    pub fn end_time(&self) -> Option<&str> {
        self.end_time.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tag match ignoring case, spaces and underscores, as the runner does.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.tags.iter().any(|t| normalize_tag(t) == wanted)
    }

    pub fn error_msg(&self) -> Option<&str> {
        self.error_msg.as_deref()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Escaped path of this case from the run root
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

    /// Path of the enclosing suite, if attached
    pub fn parent_id(&self) -> Option<&str> {
        self.link.parent.as_ref().map(|p| p.id.as_str())
    }

    /// Build this case was tallied under
    pub fn owner(&self) -> Option<&Build> {
        self.link.owner.as_deref()
    }

    pub(crate) fn cache(&self) -> &CaseCache {
        &self.cache
    }

    pub(crate) fn attach(&mut self, parent: ParentRef) {
        self.link.parent = Some(parent);
    }

    pub(crate) fn set_owner(&mut self, owner: Option<&std::sync::Arc<Build>>) {
        self.link.owner = owner.cloned();
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

/// Milliseconds from `start` to `end`, never negative.
///
/// Returns `None` when either timestamp cannot be parsed.
pub fn time_difference(start: &str, end: &str) -> Option<u64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let millis = (end - start).num_milliseconds();
    Some(millis.max(0) as u64)
}
