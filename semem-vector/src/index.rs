//! Type-partitioned HNSW vector index (`spec.md` §4.D). Partitions queries
//! into the "retrievable" element types (`TextElement`, `SemanticUnit`,
//! `Attribute`, `CommunityElement`) versus `Entity`, each backed by its own
//! `hnsw_rs` graph. Grounded on `llmspell-rag/traits/hnsw.rs`'s
//! `HNSWConfig`/`DistanceMetric` and `llmspell-memory/episodic/hnsw_backend.rs`'s
//! wrap-storage-behind-an-id-map pattern (the teacher's `HNSWVectorStorage`
//! isn't available as source, so the insert/search plumbing here is our own,
//! built directly on `hnsw_rs`).
//!
//! `hnsw_rs` has no native delete, so `remove` tombstones the internal index
//! slot; tombstoned neighbours are filtered out of search results. A
//! partition that accumulates many tombstones should be rebuilt via
//! [`VectorIndex::rebuild_partition`] from the Graph Store.

use dashmap::DashMap;
use hnsw_rs::dist::{DistCosine, DistDot, DistL2};
use hnsw_rs::hnsw::Hnsw;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

use crate::error::{Result, VectorError};
use crate::metric::DistanceMetric;

/// Which side of the type partition a search targets (`spec.md` §4.D:
/// "queries may restrict search to {TextElement, Unit, Attribute,
/// CommunityElement} or to {Entity}").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Retrievable,
    Entity,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PartitionKey {
    Retrievable,
    Entity,
}

impl PartitionKey {
    fn for_element_type(element_type: &str) -> Self {
        if element_type == "Entity" {
            Self::Entity
        } else {
            Self::Retrievable
        }
    }

    fn matches(self, filter: TypeFilter) -> bool {
        matches!((self, filter), (_, TypeFilter::All) | (Self::Retrievable, TypeFilter::Retrievable) | (Self::Entity, TypeFilter::Entity))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexParams {
    pub dimension: usize,
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
    pub max_elements: usize,
    pub metric: DistanceMetric,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self { dimension: 384, m: 16, ef_construction: 200, ef_search: 50, max_elements: 1_000_000, metric: DistanceMetric::Cosine }
    }
}

enum Backend {
    Cosine(Hnsw<'static, f32, DistCosine>),
    Euclidean(Hnsw<'static, f32, DistL2>),
    DotProduct(Hnsw<'static, f32, DistDot>),
}

impl Backend {
    fn new(params: &IndexParams) -> Self {
        let max_layer = 16.min((params.max_elements.max(2) as f32).ln().ceil() as usize);
        match params.metric {
            DistanceMetric::Cosine => Self::Cosine(Hnsw::new(params.m, params.max_elements, max_layer, params.ef_construction, DistCosine {})),
            DistanceMetric::Euclidean => Self::Euclidean(Hnsw::new(params.m, params.max_elements, max_layer, params.ef_construction, DistL2 {})),
            DistanceMetric::DotProduct => Self::DotProduct(Hnsw::new(params.m, params.max_elements, max_layer, params.ef_construction, DistDot {})),
        }
    }

    fn insert(&self, vector: &[f32], slot: usize) {
        match self {
            Self::Cosine(h) => h.insert((vector, slot)),
            Self::Euclidean(h) => h.insert((vector, slot)),
            Self::DotProduct(h) => h.insert((vector, slot)),
        }
    }

    fn search(&self, vector: &[f32], k: usize, ef_search: usize) -> Vec<(usize, f32)> {
        let neighbours = match self {
            Self::Cosine(h) => h.search(vector, k, ef_search),
            Self::Euclidean(h) => h.search(vector, k, ef_search),
            Self::DotProduct(h) => h.search(vector, k, ef_search),
        };
        neighbours.into_iter().map(|n| (n.d_id, n.distance)).collect()
    }
}

fn score_from_distance(metric: DistanceMetric, distance: f32) -> f32 {
    match metric {
        DistanceMetric::Cosine => 1.0 - distance,
        DistanceMetric::Euclidean | DistanceMetric::DotProduct => -distance,
    }
}

struct Partition {
    backend: Backend,
    id_to_slot: HashMap<String, usize>,
    slot_to_id: Vec<Option<String>>,
    tombstones: HashSet<usize>,
}

impl Partition {
    fn new(params: &IndexParams) -> Self {
        Self { backend: Backend::new(params), id_to_slot: HashMap::new(), slot_to_id: Vec::new(), tombstones: HashSet::new() }
    }

    fn insert(&mut self, id: &str, vector: &[f32]) {
        if let Some(&old_slot) = self.id_to_slot.get(id) {
            self.tombstones.insert(old_slot);
        }
        let slot = self.slot_to_id.len();
        self.slot_to_id.push(Some(id.to_string()));
        self.id_to_slot.insert(id.to_string(), slot);
        self.backend.insert(vector, slot);
    }

    fn remove(&mut self, id: &str) -> bool {
        if let Some(slot) = self.id_to_slot.remove(id) {
            self.tombstones.insert(slot);
            self.slot_to_id[slot] = None;
            true
        } else {
            false
        }
    }

    fn search(&self, vector: &[f32], k: usize, ef_search: usize, metric: DistanceMetric, threshold: Option<f32>) -> Vec<(String, f32)> {
        let overshoot = k + self.tombstones.len().min(k.max(1));
        self.backend
            .search(vector, overshoot.max(k), ef_search)
            .into_iter()
            .filter(|(slot, _)| !self.tombstones.contains(slot))
            .filter_map(|(slot, distance)| self.slot_to_id.get(slot).and_then(Option::as_ref).map(|id| (id.clone(), distance)))
            .map(|(id, distance)| (id, score_from_distance(metric, distance)))
            .filter(|(_, score)| match threshold {
                Some(t) => *score >= t,
                None => true,
            })
            .take(k)
            .collect()
    }
}

/// The Vector Index (`spec.md` §4.D). Thread-safe via an internal lock per
/// partition; cheap to clone behind an `Arc`.
pub struct VectorIndex {
    params: IndexParams,
    partitions: DashMap<PartitionKey, RwLock<Partition>>,
}

impl VectorIndex {
    #[must_use]
    pub fn new(params: IndexParams) -> Self {
        Self { params, partitions: DashMap::new() }
    }

    fn partition(&self, key: PartitionKey) -> dashmap::mapref::one::Ref<'_, PartitionKey, RwLock<Partition>> {
        self.partitions.entry(key).or_insert_with(|| RwLock::new(Partition::new(&self.params)));
        self.partitions.get(&key).expect("just inserted")
    }

    /// `spec.md` §4.D: `add(id, vector, type)`.
    ///
    /// # Errors
    /// Returns [`VectorError::DimensionMismatch`] if `vector.len()` doesn't
    /// match the index's configured dimension.
    #[instrument(skip(self, vector), fields(id = %id, element_type = %element_type))]
    pub fn add(&self, id: &str, vector: &[f32], element_type: &str) -> Result<()> {
        if vector.len() != self.params.dimension {
            return Err(VectorError::DimensionMismatch { expected: self.params.dimension, actual: vector.len() });
        }
        let key = PartitionKey::for_element_type(element_type);
        self.partition(key).write().insert(id, vector);
        debug!("inserted vector into index");
        Ok(())
    }

    /// `spec.md` §4.D: `remove(id)`. Returns whether `id` was present in
    /// either partition.
    pub fn remove(&self, id: &str) -> bool {
        let mut removed = false;
        for entry in self.partitions.iter() {
            removed |= entry.value().write().remove(id);
        }
        removed
    }

    /// `spec.md` §4.D: `search(vector, k, typeFilter?, threshold?)`.
    ///
    /// # Errors
    /// Returns [`VectorError::DimensionMismatch`] if `vector.len()` doesn't
    /// match the index's configured dimension.
    #[instrument(skip(self, vector), fields(k))]
    pub fn search(&self, vector: &[f32], k: usize, filter: TypeFilter, threshold: Option<f32>) -> Result<Vec<(String, f32)>> {
        if vector.len() != self.params.dimension {
            return Err(VectorError::DimensionMismatch { expected: self.params.dimension, actual: vector.len() });
        }
        let mut results: Vec<(String, f32)> = Vec::new();
        for key in [PartitionKey::Retrievable, PartitionKey::Entity] {
            if !key.matches(filter) {
                continue;
            }
            if let Some(entry) = self.partitions.get(&key) {
                results.extend(entry.read().search(vector, k, self.params.ef_search, self.params.metric, threshold));
            }
        }
        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        results.truncate(k);
        Ok(results)
    }

    /// Rebuild a single partition from scratch from externally supplied
    /// `(id, vector)` pairs (`spec.md` §4.D: "the index must be rebuildable
    /// offline from the Graph Store"). Discards existing tombstones.
    pub fn rebuild_partition(&self, element_type_hint: &str, entries: impl IntoIterator<Item = (String, Vec<f32>)>) {
        let key = PartitionKey::for_element_type(element_type_hint);
        let mut partition = Partition::new(&self.params);
        for (id, vector) in entries {
            partition.insert(&id, &vector);
        }
        self.partitions.insert(key, RwLock::new(partition));
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.params.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(dim: usize) -> IndexParams {
        IndexParams { dimension: dim, m: 8, ef_construction: 64, ef_search: 32, max_elements: 1000, metric: DistanceMetric::Cosine }
    }

    #[test]
    fn rejects_mismatched_dimension() {
        let index = VectorIndex::new(params(3));
        let err = index.add("a", &[1.0, 2.0], "Entity").unwrap_err();
        assert!(matches!(err, VectorError::DimensionMismatch { .. }));
    }

    #[test]
    fn finds_exact_match_with_high_score() {
        let index = VectorIndex::new(params(4));
        index.add("a", &[1.0, 0.0, 0.0, 0.0], "TextElement").unwrap();
        index.add("b", &[0.0, 1.0, 0.0, 0.0], "TextElement").unwrap();
        let results = index.search(&[1.0, 0.0, 0.0, 0.0], 1, TypeFilter::Retrievable, None).unwrap();
        assert_eq!(results[0].0, "a");
        assert!(results[0].1 > 0.9);
    }

    #[test]
    fn entity_and_retrievable_partitions_are_isolated() {
        let index = VectorIndex::new(params(2));
        index.add("entity-1", &[1.0, 0.0], "Entity").unwrap();
        index.add("unit-1", &[1.0, 0.0], "SemanticUnit").unwrap();
        let entity_only = index.search(&[1.0, 0.0], 5, TypeFilter::Entity, None).unwrap();
        assert_eq!(entity_only.len(), 1);
        assert_eq!(entity_only[0].0, "entity-1");
    }

    #[test]
    fn removed_ids_are_excluded_from_search() {
        let index = VectorIndex::new(params(2));
        index.add("a", &[1.0, 0.0], "Entity").unwrap();
        assert!(index.remove("a"));
        let results = index.search(&[1.0, 0.0], 5, TypeFilter::Entity, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn threshold_filters_low_scoring_matches() {
        let index = VectorIndex::new(params(2));
        index.add("a", &[1.0, 0.0], "Entity").unwrap();
        index.add("b", &[0.0, 1.0], "Entity").unwrap();
        let results = index.search(&[1.0, 0.0], 5, TypeFilter::Entity, Some(0.9)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "a");
    }
}
