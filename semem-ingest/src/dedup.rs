//! Idempotency tracking (`spec.md` §4.K: "All stages are idempotent given
//! the same inputs and configuration: re-running must not duplicate
//! Elements (dedup by content hash and by normalized Entity label)").
//! Grounded on `semem_rdf::entities::normalize_label` (already the label
//! normalization every other crate in this workspace uses) plus
//! `semem_core::fingerprint::content_hash`.

use std::collections::{HashMap, HashSet};

use semem_rdf::entities::normalize_label;

/// Tracks what an ingestion run has already produced, so re-running
/// `decompose`/`augment`/`aggregate`/`enrich` over the same inputs is a
/// no-op rather than a duplicate.
#[derive(Debug, Default)]
pub struct DedupTracker {
    content_hashes: HashSet<String>,
    entity_labels: HashMap<String, String>,
}

impl DedupTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from Entities already persisted in the target graph, so a
    /// second `decompose` run over the same chunks reuses their URIs
    /// instead of minting new ones.
    pub fn seed_entity_labels<'a>(&mut self, existing: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (label, uri) in existing {
            self.entity_labels.insert(normalize_label(label), uri.to_string());
        }
    }

    /// Returns the existing URI for `label` if one was already seen or
    /// seeded, normalizing first so casing/punctuation don't cause
    /// spurious duplicates (`spec.md` §4.K step 2: "deduped against
    /// existing Entities by normalized label").
    #[must_use]
    pub fn existing_entity_uri(&self, label: &str) -> Option<&str> {
        self.entity_labels.get(&normalize_label(label)).map(String::as_str)
    }

    pub fn record_entity(&mut self, label: &str, uri: impl Into<String>) {
        self.entity_labels.insert(normalize_label(label), uri.into());
    }

    /// Returns `true` if `hash` has not been seen before, recording it as
    /// seen. Used to dedup Attributes, CommunityElements, and `similar`
    /// Relationships by content hash.
    pub fn observe_content_hash(&mut self, hash: impl Into<String>) -> bool {
        self.content_hashes.insert(hash.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_labels_are_matched_case_and_punctuation_insensitively() {
        let mut tracker = DedupTracker::new();
        tracker.seed_entity_labels([("Alice Smith", "urn:e1")]);
        assert_eq!(tracker.existing_entity_uri("alice-smith"), Some("urn:e1"));
    }

    #[test]
    fn content_hash_is_only_observed_once() {
        let mut tracker = DedupTracker::new();
        assert!(tracker.observe_content_hash("abc"));
        assert!(!tracker.observe_content_hash("abc"));
    }
}
