//! `enrich` (`spec.md` §4.K step 4): embed every retrievable element and
//! insert into the Vector Index, then derive `similar` Relationships
//! between elements above a configured cosine-similarity threshold.
//! Grounded on `semem_vector::index::VectorIndex::search`, reused the same
//! way `semem_retrieval::retriever::DualRetriever` uses it for its
//! similarity stage — an ANN query against the index just-populated,
//! rather than a hand-rolled pairwise comparison.

use std::sync::Arc;

use semem_config::IngestConfig;
use semem_core::providers::EmbeddingProvider;
use semem_rdf::entities::Relationship;
use semem_vector::index::{TypeFilter, VectorIndex};
use tracing::{instrument, warn};

use crate::dedup::DedupTracker;
use crate::types::EnrichResult;

/// One retrievable element to embed: its URI, text, and the `element_type`
/// string `VectorIndex::add` partitions on.
pub struct EnrichableElement<'a> {
    pub uri: &'a str,
    pub text: &'a str,
    pub element_type: &'a str,
}

pub struct Enricher {
    vector_index: Arc<VectorIndex>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    config: IngestConfig,
}

impl Enricher {
    #[must_use]
    pub fn new(vector_index: Arc<VectorIndex>, embedding_provider: Arc<dyn EmbeddingProvider>, config: IngestConfig) -> Self {
        Self { vector_index, embedding_provider, config }
    }

    #[instrument(skip(self, elements, dedup))]
    pub async fn enrich(&self, base_uri: &str, graph: &str, elements: &[EnrichableElement<'_>], dedup: &mut DedupTracker) -> EnrichResult {
        let texts: Vec<String> = elements.iter().map(|e| e.text.to_string()).collect();
        let embeddings = match self.embedding_provider.embed(&texts).await {
            Ok(embeddings) => embeddings,
            Err(err) => {
                warn!(error = %err, "embedding provider failed, enrich produced no vectors or similarity edges");
                return EnrichResult::default();
            }
        };

        let mut embedded_count = 0;
        for (element, embedding) in elements.iter().zip(&embeddings) {
            if let Err(err) = self.vector_index.add(element.uri, embedding, element.element_type) {
                warn!(error = %err, uri = element.uri, "vector index insert failed for element");
                continue;
            }
            embedded_count += 1;
        }

        let mut similarity_edges = Vec::new();
        for (element, embedding) in elements.iter().zip(&embeddings) {
            let hits = match self.vector_index.search(embedding, elements.len().min(20).max(1), TypeFilter::All, Some(self.config.similarity_edge_threshold)) {
                Ok(hits) => hits,
                Err(err) => {
                    warn!(error = %err, uri = element.uri, "similarity search failed for element");
                    continue;
                }
            };

            for (other_uri, score) in hits {
                if other_uri == element.uri {
                    continue;
                }
                let pair_key = unordered_pair_key(element.uri, &other_uri);
                if !dedup.observe_content_hash(format!("similar:{pair_key}")) {
                    continue;
                }
                similarity_edges.push(Relationship::new(base_uri, graph, element.uri, other_uri, "similar").with_weight(f64::from(score)));
            }
        }

        EnrichResult { embedded_count, similarity_edges }
    }
}

fn unordered_pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semem_providers::mock::DeterministicEmbeddingProvider;
    use semem_vector::index::IndexParams;

    fn enricher() -> Enricher {
        let vector_index = Arc::new(VectorIndex::new(IndexParams { dimension: 8, ..Default::default() }));
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(DeterministicEmbeddingProvider::new(8));
        Enricher::new(vector_index, embedding_provider, IngestConfig { similarity_edge_threshold: 0.0, ..IngestConfig::default() })
    }

    #[tokio::test]
    async fn enrich_embeds_every_element() {
        let enricher = enricher();
        let mut dedup = DedupTracker::new();
        let elements = vec![
            EnrichableElement { uri: "urn:u1", text: "alice works at acme", element_type: "SemanticUnit" },
            EnrichableElement { uri: "urn:u2", text: "alice works at acme", element_type: "SemanticUnit" },
        ];
        let result = enricher.enrich("urn:test", "g1", &elements, &mut dedup).await;
        assert_eq!(result.embedded_count, 2);
    }

    #[tokio::test]
    async fn each_similarity_edge_is_only_produced_once() {
        let enricher = enricher();
        let mut dedup = DedupTracker::new();
        let elements = vec![
            EnrichableElement { uri: "urn:u1", text: "alice works at acme", element_type: "SemanticUnit" },
            EnrichableElement { uri: "urn:u2", text: "alice works at acme", element_type: "SemanticUnit" },
        ];
        enricher.enrich("urn:test", "g1", &elements, &mut dedup).await;
        let second = enricher.enrich("urn:test", "g1", &elements, &mut dedup).await;
        assert!(second.similarity_edges.is_empty());
    }
}
