//! The Dual Retriever (`spec.md` §4.H): exact label match + Vector Index
//! similarity + personalized PageRank over the Relationship graph, merged
//! by a weighted sum. Grounded on
//! `llmspell-context::retrieval::hybrid_rag_memory::HybridRetriever`'s
//! validated-weight merge pattern, generalized from two sources (RAG +
//! memory) to three (exact, similarity, PPR) and from a flat score to one
//! that also tracks per-stage provenance.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use semem_algo::graph_view::GraphView;
use semem_algo::pagerank::{personalized_pagerank, PprConfig};
use semem_concepts::extractor::ConceptExtractor;
use semem_config::DualRetrievalConfig;
use semem_core::providers::EmbeddingProvider;
use semem_vector::index::{TypeFilter, VectorIndex};
use tracing::{instrument, warn};

use crate::catalog::RetrievalCatalog;
use crate::types::{Provenance, RetrievalHit, RetrievalMode};

pub struct DualRetriever {
    catalog: RwLock<RetrievalCatalog>,
    vector_index: Arc<VectorIndex>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    concept_extractor: Arc<ConceptExtractor>,
    config: DualRetrievalConfig,
    ppr_config: PprConfig,
}

impl DualRetriever {
    #[must_use]
    pub fn new(
        vector_index: Arc<VectorIndex>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        concept_extractor: Arc<ConceptExtractor>,
        config: DualRetrievalConfig,
        ppr_config: PprConfig,
    ) -> Self {
        Self { catalog: RwLock::new(RetrievalCatalog::default()), vector_index, embedding_provider, concept_extractor, config, ppr_config }
    }

    /// Replace the label/type/edge snapshot the exact-match and PPR stages
    /// read from (`spec.md` §4.H: the Ingestion Pipeline rebuilds this
    /// after `decompose`/`augment` run).
    pub fn refresh_catalog(&self, catalog: RetrievalCatalog) {
        *self.catalog.write() = catalog;
    }

    /// `spec.md` §4.H "Retrieval": run exact match, similarity, and PPR,
    /// then merge. `mode` selects which stages run at all; `Dual` runs all
    /// three, `Exact`/`Similarity` skip the others (and PPR, which seeds
    /// from both). Never errors at the API boundary: a failing stage
    /// contributes zero and is logged, matching the Memory Store's
    /// failure semantics (`spec.md` §4.F).
    #[instrument(skip(self, query))]
    pub async fn retrieve(&self, query: &str, k: usize, threshold: f32, mode: RetrievalMode) -> Vec<RetrievalHit> {
        let catalog = self.catalog.read().clone();

        let exact_hits: Vec<String> = if matches!(mode, RetrievalMode::Exact | RetrievalMode::Dual) {
            let query_concepts = self.concept_extractor.extract(query).await.concepts;
            query_concepts.iter().flat_map(|token| catalog.exact_match(token).iter().cloned()).collect()
        } else {
            Vec::new()
        };

        let similarity_hits: Vec<(String, f32)> = if matches!(mode, RetrievalMode::Similarity | RetrievalMode::Dual) {
            match self.embedding_provider.embed(&[query.to_string()]).await {
                Ok(mut embeddings) if !embeddings.is_empty() => {
                    let query_embedding = embeddings.remove(0);
                    match self.vector_index.search(&query_embedding, k, TypeFilter::All, Some(threshold)) {
                        Ok(hits) => hits,
                        Err(err) => {
                            warn!(error = %err, "vector index search failed, similarity stage contributes nothing");
                            Vec::new()
                        }
                    }
                }
                Ok(_) => {
                    warn!("embedding provider returned no vectors for query");
                    Vec::new()
                }
                Err(err) => {
                    warn!(error = %err, "embedding provider failed, similarity stage contributes nothing");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut seeds: Vec<String> = exact_hits.clone();
        seeds.extend(similarity_hits.iter().map(|(uri, _)| uri.clone()));
        seeds.sort();
        seeds.dedup();

        let ppr_scores: BTreeMap<String, f64> = if !matches!(mode, RetrievalMode::Dual) || seeds.is_empty() {
            BTreeMap::new()
        } else {
            let view = GraphView::new(catalog.entity_uris().iter().cloned(), catalog.relationship_edges().iter().cloned());
            personalized_pagerank(&view, &seeds, &self.ppr_config).result
        };

        let mut merged: HashMap<String, RetrievalHit> = HashMap::new();
        for uri in exact_hits {
            let hit = merged.entry(uri.clone()).or_insert_with(|| blank_hit(&uri, &catalog));
            hit.exact_score = 1.0;
            hit.provenance.exact = true;
        }
        for (uri, score) in similarity_hits {
            let hit = merged.entry(uri.clone()).or_insert_with(|| blank_hit(&uri, &catalog));
            hit.similarity_score = f64::from(score);
            hit.provenance.similarity = true;
        }
        for (uri, score) in ppr_scores {
            let hit = merged.entry(uri.clone()).or_insert_with(|| blank_hit(&uri, &catalog));
            hit.ppr_score = score;
            hit.provenance.ppr = true;
        }

        for hit in merged.values_mut() {
            hit.final_score =
                self.config.weight_exact * hit.exact_score + self.config.weight_similarity * hit.similarity_score + self.config.weight_ppr * hit.ppr_score;
        }

        let mut ranked: Vec<RetrievalHit> = merged.into_values().collect();
        ranked.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.uri.cmp(&b.uri)));
        ranked.truncate(self.config.combined_limit);
        ranked
    }
}

fn blank_hit(uri: &str, catalog: &RetrievalCatalog) -> RetrievalHit {
    RetrievalHit {
        uri: uri.to_string(),
        element_type: RetrievalHit::element_type_str(catalog.element_type(uri)),
        exact_score: 0.0,
        similarity_score: 0.0,
        ppr_score: 0.0,
        final_score: 0.0,
        provenance: Provenance::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semem_concepts::extractor::ConceptExtractor;
    use semem_config::ConceptConfig;
    use semem_providers::mock::{DeterministicEmbeddingProvider, EchoChatProvider};
    use semem_rdf::entities::{Entity, Relationship};
    use semem_vector::index::IndexParams;

    fn entity(uri: &str, label: &str) -> Entity {
        let mut e = Entity::new(uri, "g1", label, "corpus");
        e.base = e.base.with_uri(uri);
        e
    }

    fn relationship(uri: &str, source: &str, target: &str, weight: f64) -> Relationship {
        let mut r = Relationship::new(uri, "g1", source, target, "relatesTo").with_weight(weight);
        r.base = r.base.with_uri(uri);
        r
    }

    fn retriever() -> DualRetriever {
        let vector_index = Arc::new(VectorIndex::new(IndexParams { dimension: 8, ..Default::default() }));
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(DeterministicEmbeddingProvider::new(8));
        let concept_extractor = Arc::new(ConceptExtractor::new(Arc::new(EchoChatProvider), ConceptConfig::default()));
        DualRetriever::new(vector_index, embedding_provider, concept_extractor, DualRetrievalConfig::default(), PprConfig::default())
    }

    #[tokio::test]
    async fn retrieve_with_empty_catalog_and_index_returns_nothing() {
        let retriever = retriever();
        let hits = retriever.retrieve("anything", 5, 0.0, RetrievalMode::Dual).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn exact_match_contributes_even_without_vector_hits() {
        let retriever = retriever();
        let alice = entity("urn:alice", "alice");
        retriever.refresh_catalog(RetrievalCatalog::build(&[alice], &[], &[]));

        let hits = retriever.retrieve("alice", 5, 1.1, RetrievalMode::Dual).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uri, "urn:alice");
        assert!(hits[0].provenance.exact);
        assert!(hits[0].final_score > 0.0);
    }

    #[tokio::test]
    async fn ppr_spreads_from_exact_seed_to_related_entity() {
        let retriever = retriever();
        let alice = entity("urn:alice", "alice");
        let bob = entity("urn:bob", "bob");
        let rel = relationship("urn:rel1", "urn:alice", "urn:bob", 1.0);
        retriever.refresh_catalog(RetrievalCatalog::build(&[alice, bob], &[], &[rel]));

        let hits = retriever.retrieve("alice", 5, 1.1, RetrievalMode::Dual).await;
        let bob_hit = hits.iter().find(|h| h.uri == "urn:bob");
        assert!(bob_hit.is_some_and(|h| h.ppr_score > 0.0 && h.provenance.ppr));
    }
}
