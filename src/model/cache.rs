//! Runtime links and memoized values carried by result nodes
//!
//! The tree is read-only after tally. The only value written afterwards is a
//! case's failed-since build number, which lives behind a mutex here.

use crate::history::Build;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identity of a node's parent suite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRef {
    /// Escaped path of the parent from the run root.
    pub id: String,
    /// Dotted display name of the parent.
    pub full_name: String,
}

/// Links rebuilt on insertion and on every tally; never persisted.
#[derive(Debug, Clone, Default)]
pub struct NodeLink {
    pub parent: Option<ParentRef>,
    pub owner: Option<Arc<Build>>,
}

/// Memoized failed-since build number; 0 means not yet computed.
#[derive(Debug, Default)]
pub struct CaseCache {
    failed_since: Mutex<u32>,
}

impl CaseCache {
    pub fn with_failed_since(value: u32) -> Self {
        CaseCache {
            failed_since: Mutex::new(value),
        }
    }

    /// Hold the guard for a read-recompute-cache sequence.
    ///
    /// Walks that hold one guard and take another always go from a later
    /// build to an earlier one.
    pub fn lock(&self) -> MutexGuard<'_, u32> {
        self.failed_since
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn failed_since(&self) -> Option<u32> {
        let value = *self.lock();
        (value != 0).then_some(value)
    }

    pub fn store(&self, value: u32) {
        *self.lock() = value;
    }

    pub fn clear(&self) {
        self.store(0);
    }
}

impl Clone for CaseCache {
    fn clone(&self) -> Self {
        CaseCache::with_failed_since(*self.lock())
    }
}

impl Serialize for CaseCache {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*self.lock())
    }
}

impl<'de> Deserialize<'de> for CaseCache {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(CaseCache::with_failed_since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_starts_empty() {
        let cache = CaseCache::default();
        assert_eq!(cache.failed_since(), None);
        cache.store(7);
        assert_eq!(cache.failed_since(), Some(7));
        cache.clear();
        assert_eq!(cache.failed_since(), None);
    }

    #[test]
    fn test_cache_serializes_as_number() {
        let cache = CaseCache::with_failed_since(12);
        assert_eq!(serde_json::to_string(&cache).unwrap(), "12");
        let back: CaseCache = serde_json::from_str("12").unwrap();
        assert_eq!(back.failed_since(), Some(12));
    }
}
