//! Memory Store (`spec.md` §4.F): Interactions partitioned into
//! `shortTerm`/`longTerm`, the Concept Graph, decay/reinforcement, tiering
//! maintenance, and spreading-activation retrieval. Grounded on
//! `llmspell-memory::episodic::in_memory::InMemoryEpisodicMemory`'s
//! `Arc<RwLock<HashMap>>` storage shape and cosine-similarity retrieval,
//! generalized with the decay/concept-graph machinery `spec.md` §4.F adds
//! on top.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use semem_concepts::extractor::ConceptExtractor;
use semem_config::{DecayConfig, SpreadingActivationConfig};
use semem_core::providers::EmbeddingProvider;
use semem_vector::index::{TypeFilter, VectorIndex};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{instrument, warn};

use crate::concept_graph::ConceptGraph;
use crate::decay::{apply_access, decay_component, reinforcement_boost};
use crate::error::Result;
use crate::types::{Interaction, InteractionAdded, ScoredInteraction, Tier};

/// How many extra candidates to over-fetch from the Vector Index beyond
/// `k`, so the concept-weighted rerank in step 4 has room to reorder
/// within a wider similarity band than a bare top-k cutoff would allow.
const CANDIDATE_OVERFETCH: usize = 4;

const ELEMENT_TYPE_UNIT: &str = "SemanticUnit";

pub struct MemoryStore {
    interactions: DashMap<String, RwLock<Interaction>>,
    short_term: RwLock<Vec<String>>,
    long_term: RwLock<Vec<String>>,
    concept_graph: ConceptGraph,
    vector_index: Arc<VectorIndex>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    concept_extractor: Arc<ConceptExtractor>,
    decay_config: DecayConfig,
    spreading_config: SpreadingActivationConfig,
    events: broadcast::Sender<InteractionAdded>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(
        vector_index: Arc<VectorIndex>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        concept_extractor: Arc<ConceptExtractor>,
        decay_config: DecayConfig,
        spreading_config: SpreadingActivationConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            interactions: DashMap::new(),
            short_term: RwLock::new(Vec::new()),
            long_term: RwLock::new(Vec::new()),
            concept_graph: ConceptGraph::new(),
            vector_index,
            embedding_provider,
            concept_extractor,
            decay_config,
            spreading_config,
            events,
        }
    }

    /// Subscribe to `interactionAdded` events (`spec.md` §4.F step 4).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<InteractionAdded> {
        self.events.subscribe()
    }

    /// Ingest one prompt/response pair (`spec.md` §4.F "Ingest").
    ///
    /// # Errors
    /// Returns an error if the embedding can't be inserted into the Vector
    /// Index (e.g. dimension mismatch, capacity exceeded).
    #[instrument(skip(self, prompt, response, embedding, concepts, metadata))]
    pub fn add(&self, prompt: String, response: String, embedding: Vec<f32>, concepts: Vec<String>, metadata: Value) -> Result<String> {
        let interaction = Interaction::new(prompt, response, embedding, concepts, metadata);
        let id = interaction.id.clone();

        self.vector_index.add(&id, &interaction.embedding, ELEMENT_TYPE_UNIT)?;
        self.concept_graph.add_interaction(&interaction.concepts);
        self.short_term.write().push(id.clone());
        self.interactions.insert(id.clone(), RwLock::new(interaction));

        let _ = self.events.send(InteractionAdded { id: id.clone() });
        Ok(id)
    }

    /// Retrieve the top-`k` interactions for `query` (`spec.md` §4.F
    /// "Retrieval"). Never errors at the API boundary: an embedding
    /// provider failure yields an empty result, logged (`spec.md` §4.F
    /// "Failure semantics").
    #[instrument(skip(self, query))]
    pub async fn retrieve(&self, query: &str, k: usize, threshold: f32) -> Vec<ScoredInteraction> {
        let query_embedding = match self.embedding_provider.embed(&[query.to_string()]).await {
            Ok(mut embeddings) if !embeddings.is_empty() => embeddings.remove(0),
            Ok(_) => {
                warn!("embedding provider returned no vectors for query");
                return Vec::new();
            }
            Err(err) => {
                warn!(error = %err, "embedding provider failed, returning empty candidate set");
                return Vec::new();
            }
        };

        let query_concepts = self.concept_extractor.extract(query).await.concepts;
        let activation = self.concept_graph.spreading_activation(&query_concepts, self.spreading_config.depth, self.spreading_config.hop_decay);

        let overfetch = k.saturating_mul(CANDIDATE_OVERFETCH).max(k);
        let candidates = match self.vector_index.search(&query_embedding, overfetch, TypeFilter::Retrievable, Some(threshold)) {
            Ok(hits) => hits,
            Err(err) => {
                warn!(error = %err, "vector index search failed, returning empty candidate set");
                return Vec::new();
            }
        };

        let now = chrono::Utc::now();
        let mut scored: Vec<ScoredInteraction> = candidates
            .into_iter()
            .filter_map(|(id, similarity)| {
                let entry = self.interactions.get(&id)?;
                let snapshot = entry.read().clone();
                let concept_score = ConceptGraph::concept_score(&activation, &snapshot.concepts);
                let effective_decay = snapshot.decay_factor * decay_component(snapshot.last_accessed, now, self.decay_config.lambda);
                let score = f64::from(similarity) * effective_decay * (1.0 + reinforcement_boost(snapshot.access_count))
                    + self.spreading_config.concept_weight * concept_score;
                Some(ScoredInteraction { interaction: snapshot, similarity, concept_score, score })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        for hit in &mut scored {
            if let Some(entry) = self.interactions.get(&hit.interaction.id) {
                let mut stored = entry.write();
                apply_access(&mut stored, now, &self.decay_config);
                hit.interaction = stored.clone();
            }
        }

        scored
    }

    /// Promote Interactions whose `access_count` has crossed
    /// `promotion_threshold` from `shortTerm` to `longTerm` (`spec.md`
    /// §4.F "Tiering"). Idempotent: an already-long-tier Interaction is
    /// left untouched. Returns the number promoted this call.
    #[instrument(skip(self))]
    pub fn run_maintenance(&self) -> usize {
        let mut promoted_ids = Vec::new();
        {
            let short_term = self.short_term.read();
            for id in short_term.iter() {
                if let Some(entry) = self.interactions.get(id) {
                    if entry.read().access_count >= self.decay_config.promotion_threshold {
                        promoted_ids.push(id.clone());
                    }
                }
            }
        }

        if promoted_ids.is_empty() {
            return 0;
        }

        {
            let mut short_term = self.short_term.write();
            short_term.retain(|id| !promoted_ids.contains(id));
        }
        self.long_term.write().extend(promoted_ids.iter().cloned());
        for id in &promoted_ids {
            if let Some(entry) = self.interactions.get(id) {
                entry.write().tier = Tier::Long;
            }
        }

        promoted_ids.len()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Interaction> {
        self.interactions.get(id).map(|entry| entry.read().clone())
    }

    #[must_use]
    pub fn short_term_count(&self) -> usize {
        self.short_term.read().len()
    }

    #[must_use]
    pub fn long_term_count(&self) -> usize {
        self.long_term.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semem_config::SememConfig;
    use semem_providers::mock::DeterministicEmbeddingProvider;

    fn store() -> MemoryStore {
        let cfg = SememConfig::for_testing();
        let vector_index = Arc::new(VectorIndex::new(semem_vector::index::IndexParams {
            dimension: 8,
            ..Default::default()
        }));
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(DeterministicEmbeddingProvider::new(8));
        let concept_extractor = Arc::new(ConceptExtractor::new(Arc::new(semem_providers::mock::EchoChatProvider), cfg.concepts.clone()));
        MemoryStore::new(vector_index, embedding_provider, concept_extractor, cfg.decay.clone(), cfg.spreading_activation.clone())
    }

    #[test]
    fn add_inserts_into_short_term() {
        let store = store();
        let id = store.add("hello".into(), "hi".into(), vec![0.1; 8], vec!["rust".into()], Value::Null).unwrap();
        assert_eq!(store.short_term_count(), 1);
        assert!(store.get(&id).is_some());
    }

    #[tokio::test]
    async fn retrieve_returns_empty_when_no_interactions() {
        let store = store();
        let results = store.retrieve("anything", 5, 0.0).await;
        assert!(results.is_empty());
    }

    #[test]
    fn maintenance_promotes_once_threshold_is_crossed() {
        let store = store();
        let id = store.add("p".into(), "r".into(), vec![0.1; 8], vec![], Value::Null).unwrap();
        let entry = store.interactions.get(&id).unwrap();
        entry.write().access_count = 100;
        drop(entry);

        let promoted = store.run_maintenance();
        assert_eq!(promoted, 1);
        assert_eq!(store.long_term_count(), 1);
        assert_eq!(store.short_term_count(), 0);

        // idempotent: a second run promotes nothing further
        assert_eq!(store.run_maintenance(), 0);
    }
}
