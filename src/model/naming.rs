//! Sibling keys and result paths
//!
//! Suites and cases are addressed by `/`-joined paths of their duplicate-safe
//! names. A name that collides with an existing sibling key gets the smallest
//! free `_N` suffix.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Separator between segments of a result path.
pub const PATH_SEPARATOR: char = '/';

/// Pick the key under which `name` is inserted into `siblings`.
///
/// Returns `name` itself when it is free, otherwise `name_N` with the
/// smallest positive `N` that is not already a key.
pub fn duplicate_safe_key<V>(siblings: &IndexMap<String, V>, name: &str) -> String {
    if !siblings.contains_key(name) {
        return name.to_string();
    }
    let mut n: u32 = 1;
    loop {
        let candidate = format!("{}_{}", name, n);
        if !siblings.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn legacy_unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[/\\: ]").expect("static regex is valid"))
}

/// Sanitize a name the way older persisted trees keyed their maps.
pub fn legacy_safe_name(name: &str) -> String {
    legacy_unsafe_chars().replace_all(name, "_").into_owned()
}

/// Escape a single key so that it never contains the path separator.
pub fn escape_segment(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '%' => out.push_str("%25"),
            PATH_SEPARATOR => out.push_str("%2F"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape_segment`]. Unknown escapes are kept verbatim.
pub fn unescape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3..];
        } else if tail.starts_with("%2F") || tail.starts_with("%2f") {
            out.push(PATH_SEPARATOR);
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Join an escaped parent path and a raw key.
pub fn child_path(parent: Option<&str>, key: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => {
            format!("{}{}{}", parent, PATH_SEPARATOR, escape_segment(key))
        }
        _ => escape_segment(key),
    }
}

/// Split a path into raw keys. Empty segments are dropped.
pub fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(unescape_segment)
        .collect()
}
