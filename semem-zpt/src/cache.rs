//! Selection Cache (`spec.md` §4.J step 2: "If fingerprint present in the
//! Selection Cache (TTL-bounded), return cached result"). Grounded on
//! `semem_vector`'s sharded-lock discipline note in `spec.md` §5, kept
//! simple here as a single `DashMap` since the Selection Cache's access
//! pattern (point lookups by fingerprint) doesn't need sharding beyond what
//! `DashMap` already provides.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::selection::SelectionResult;

pub struct SelectionCache {
    ttl: Duration,
    entries: DashMap<String, (Instant, SelectionResult)>,
}

impl SelectionCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: DashMap::new() }
    }

    #[must_use]
    pub fn get(&self, fingerprint: &str) -> Option<SelectionResult> {
        let entry = self.entries.get(fingerprint)?;
        let (inserted_at, result) = entry.value();
        if inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(fingerprint);
            return None;
        }
        Some(result.clone())
    }

    pub fn put(&self, fingerprint: String, result: SelectionResult) {
        self.entries.insert(fingerprint, (Instant::now(), result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SelectionResult {
        SelectionResult { items: Vec::new(), counts_by_type: Default::default() }
    }

    #[test]
    fn hit_within_ttl() {
        let cache = SelectionCache::new(Duration::from_secs(60));
        cache.put("fp1".to_string(), sample());
        assert!(cache.get("fp1").is_some());
    }

    #[test]
    fn miss_after_ttl_expires() {
        let cache = SelectionCache::new(Duration::from_millis(0));
        cache.put("fp1".to_string(), sample());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("fp1").is_none());
    }

    #[test]
    fn miss_for_unknown_key() {
        let cache = SelectionCache::new(Duration::from_secs(60));
        assert!(cache.get("nope").is_none());
    }
}
