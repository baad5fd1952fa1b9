//! Build labels for chart columns

use crate::history::Build;
use chrono::format::{Item, StrftimeItems};
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

/// Default label format: the build number with a hash prefix.
pub const DEFAULT_LABEL_FORMAT: &str = "#$build";

/// Column label of one build; ordered by build number, not by text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildLabel {
    pub number: u32,
    pub text: String,
}

impl BuildLabel {
    /// Label `build` using `format`.
    ///
    /// `$build` and `$display_name` are substituted first, then the result is
    /// used as a strftime pattern over the build time. A pattern chrono cannot
    /// parse is used verbatim.
    pub fn new(build: &Build, format: &str) -> Self {
        BuildLabel {
            number: build.number,
            text: format_label(build, format),
        }
    }
}

impl Ord for BuildLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for BuildLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BuildLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn format_label(build: &Build, format: &str) -> String {
    let number = build.number.to_string();
    let display_name = build.display_name();
    let plain = format
        .replace("$build", &number)
        .replace("$display_name", &display_name);
    let pattern = format
        .replace("$build", &number)
        .replace("$display_name", &display_name.replace('%', "%%"));

    let items = StrftimeItems::new(&pattern);
    if items.clone().any(|item| matches!(item, Item::Error)) {
        warn!(format = %format, "Invalid date format in build label, using it verbatim");
        return plain;
    }
    build.timestamp.format_with_items(items).to_string()
}
