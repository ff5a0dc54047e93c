//! Canonical JSON serialization and parameter fingerprinting (`spec.md`
//! §4.I, §9 "Parameter fingerprinting").
//!
//! The fingerprint is the cache key for ZPT selection results and, more
//! generally, for anything keyed by "this set of parameters, regardless of
//! the order the caller supplied them in". Canonicalization sorts object
//! keys recursively and removes insignificant whitespace; hashing uses
//! `sha2` (the teacher's workspace drops `blake3` in favor of `sha2` for
//! content hashing — "FIPS-compliant", per the dependency-decision notes in
//! the teacher's root `Cargo.toml` — and we follow that for every hash in
//! this codebase, not just content addressing).

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Recursively sort object keys so two structurally-equal JSON values with
/// differently-ordered keys serialize identically.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    serde_json::to_string(&canonicalize(value)).unwrap_or_default()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Collision-resistant hash of the canonical serialization of `value`,
/// returned as lowercase hex. Stable under key-order permutations (testable
/// property in `spec.md` §8).
#[must_use]
pub fn fingerprint(value: &Value) -> String {
    let canon = canonical_json(value);
    let digest = Sha256::digest(canon.as_bytes());
    hex::encode(digest)
}

/// Thin hex encoder so this crate doesn't need the `hex` crate merely for
/// `Digest` output formatting.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Hash `model ‖ text` for the embedding cache key (`spec.md` §4.A).
#[must_use]
pub fn embedding_cache_key(model: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update(b"\u{0}");
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Content hash used for dedup-by-content in the Ingestion Pipeline
/// (`spec.md` §4.K: "dedup by content hash").
#[must_use]
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fingerprint_is_stable_under_key_permutation() {
        let a = json!({"zoom": "entity", "pan": {"topic": "x", "entity": ["e1"]}});
        let b = json!({"pan": {"entity": ["e1"], "topic": "x"}, "zoom": "entity"});
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_differs_for_different_values() {
        let a = json!({"zoom": "entity"});
        let b = json!({"zoom": "unit"});
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn embedding_cache_key_distinguishes_model() {
        let a = embedding_cache_key("model-a", "hello");
        let b = embedding_cache_key("model-b", "hello");
        assert_ne!(a, b);
    }

    proptest::proptest! {
        #[test]
        fn content_hash_deterministic(s in ".*") {
            proptest::prop_assert_eq!(content_hash(&s), content_hash(&s));
        }
    }
}
