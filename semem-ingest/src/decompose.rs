//! `decompose` (`spec.md` §4.K step 1): LLM-driven unit splitting, entity
//! extraction (deduped by normalized label), relationship extraction, and
//! batched Graph Store emission. Grounded on `semem_concepts::extractor`
//! for the entity/relationship half of this stage — a Concept Extractor
//! call over a Unit's content already yields both concept tokens (this
//! stage's Entities) and `(subject, predicate, object)` triples over them
//! (this stage's Relationships), so `decompose` reuses it rather than
//! re-deriving the same extraction.

use std::sync::Arc;

use semem_config::IngestConfig;
use semem_core::providers::{ChatMessage, ChatProvider, ChatRequest};
use semem_rdf::entities::{Entity, Relationship, SemanticUnit};
use semem_rdf::triple::{element_to_triples, Triple};
use semem_store::traits::GraphStore;
use tracing::{instrument, warn};

use crate::dedup::DedupTracker;
use crate::error::Result;
use crate::prompt::{unit_system_prompt, unit_user_prompt};
use crate::types::DecomposeResult;
use crate::units::parse_units;
use semem_concepts::extractor::ConceptExtractor;

pub struct Decomposer {
    chat_provider: Arc<dyn ChatProvider>,
    concept_extractor: Arc<ConceptExtractor>,
    store: Arc<dyn GraphStore>,
    config: IngestConfig,
}

impl Decomposer {
    #[must_use]
    pub fn new(chat_provider: Arc<dyn ChatProvider>, concept_extractor: Arc<ConceptExtractor>, store: Arc<dyn GraphStore>, config: IngestConfig) -> Self {
        Self { chat_provider, concept_extractor, store, config }
    }

    /// `spec.md` §4.K `decompose(textChunks[])`. `base_uri`/`graph` name
    /// where new Elements are minted and stored; `dedup` carries
    /// cross-call idempotency state (seed it from the target graph's
    /// existing Entities before a re-run).
    #[instrument(skip(self, text_chunks, dedup))]
    pub async fn decompose(&self, text_chunks: &[String], base_uri: &str, graph: &str, corpus: &str, dedup: &mut DedupTracker) -> Result<DecomposeResult> {
        let mut result = DecomposeResult::default();
        let mut triples: Vec<Triple> = Vec::new();

        for chunk in text_chunks {
            let unit_texts = self.split_units(chunk).await;

            for (offset, unit_text) in unit_texts.into_iter().enumerate() {
                let (start, end) = locate_offsets(chunk, &unit_text, offset);
                let mut unit = SemanticUnit::new(base_uri, graph, unit_text.clone(), corpus, start, end);

                let extraction = self.concept_extractor.extract(&unit_text).await;
                let mut uri_by_concept: std::collections::HashMap<String, String> = std::collections::HashMap::new();

                for concept in &extraction.concepts {
                    let uri = match dedup.existing_entity_uri(concept) {
                        Some(existing) => existing.to_string(),
                        None => {
                            let entity = Entity::new(base_uri, graph, concept.clone(), corpus);
                            let uri = entity.base.uri.clone();
                            dedup.record_entity(concept, uri.clone());
                            result.entities.push(entity);
                            uri
                        }
                    };
                    uri_by_concept.insert(concept.clone(), uri.clone());
                    unit.mention(uri, 1.0);
                }

                for triple in &extraction.triples {
                    if let (Some(source), Some(target)) = (uri_by_concept.get(&triple.subject), uri_by_concept.get(&triple.object)) {
                        result.relationships.push(Relationship::new(base_uri, graph, source.clone(), target.clone(), triple.predicate.clone()));
                    }
                }

                triples.extend(element_to_triples(&unit));
                result.units.push(unit);
            }
        }

        for entity in &result.entities {
            triples.extend(element_to_triples(entity));
        }
        for relationship in &result.relationships {
            triples.extend(element_to_triples(relationship));
        }

        self.emit_batched(graph, triples).await?;
        Ok(result)
    }

    async fn split_units(&self, chunk: &str) -> Vec<String> {
        if chunk.trim().is_empty() {
            return Vec::new();
        }
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: unit_system_prompt() },
                ChatMessage { role: "user".to_string(), content: unit_user_prompt(chunk) },
            ],
            temperature: Some(0.0),
        };
        match self.chat_provider.chat(request).await {
            Ok(response) => parse_units(&response.text, chunk),
            Err(err) => {
                warn!(error = %err, "unit-split provider call failed, treating chunk as one unit");
                parse_units("", chunk)
            }
        }
    }

    async fn emit_batched(&self, graph: &str, triples: Vec<Triple>) -> Result<()> {
        for batch in triples.chunks(self.config.batch_size.max(1)) {
            self.store.insert(graph, batch.to_vec()).await?;
        }
        Ok(())
    }
}

/// Best-effort source offsets: locate `unit_text` verbatim within `chunk`;
/// if the LLM paraphrased instead of copying (violating the prompt's
/// instruction), fall back to a zero-width offset at `fallback_index`
/// rather than failing the whole unit.
fn locate_offsets(chunk: &str, unit_text: &str, fallback_index: usize) -> (usize, usize) {
    match chunk.find(unit_text) {
        Some(start) => (start, start + unit_text.len()),
        None => (fallback_index, fallback_index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semem_config::ConceptConfig;
    use semem_core::error::Result as CoreResult;
    use semem_core::providers::ChatResponse;
    use semem_store::memory::InMemoryGraphStore;

    struct ScriptedProvider {
        unit_response: &'static str,
        concept_response: &'static str,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, request: ChatRequest) -> CoreResult<ChatResponse> {
            let is_unit_request = request.messages.iter().any(|m| m.content.contains("semantic units"));
            let text = if is_unit_request { self.unit_response } else { self.concept_response };
            Ok(ChatResponse { text: text.to_string() })
        }
    }

    fn decomposer(unit_response: &'static str, concept_response: &'static str) -> Decomposer {
        let provider = Arc::new(ScriptedProvider { unit_response, concept_response });
        let concept_extractor = Arc::new(ConceptExtractor::new(provider.clone(), ConceptConfig::default()));
        let store: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::default());
        Decomposer::new(provider, concept_extractor, store, IngestConfig::default())
    }

    #[tokio::test]
    async fn decompose_creates_entities_and_units_from_chunks() {
        let decomposer = decomposer(r#"["Alice works at Acme."]"#, "1. alice\n2. acme");
        let mut dedup = DedupTracker::new();
        let result = decomposer.decompose(&["Alice works at Acme.".to_string()], "urn:test", "g1", "corpus", &mut dedup).await.unwrap();
        assert_eq!(result.units.len(), 1);
        assert_eq!(result.entities.len(), 2);
    }

    #[tokio::test]
    async fn second_decompose_over_same_label_reuses_the_entity_uri() {
        let decomposer = decomposer(r#"["Alice works at Acme."]"#, "1. alice");
        let mut dedup = DedupTracker::new();
        let first = decomposer.decompose(&["Alice works at Acme.".to_string()], "urn:test", "g1", "corpus", &mut dedup).await.unwrap();
        let second = decomposer.decompose(&["Alice works at Acme.".to_string()], "urn:test", "g1", "corpus", &mut dedup).await.unwrap();
        assert_eq!(first.entities.len(), 1);
        assert!(second.entities.is_empty());
    }

    #[tokio::test]
    async fn malformed_unit_response_falls_back_to_whole_chunk() {
        let decomposer = decomposer("not json", "");
        let mut dedup = DedupTracker::new();
        let result = decomposer.decompose(&["A single chunk of text.".to_string()], "urn:test", "g1", "corpus", &mut dedup).await.unwrap();
        assert_eq!(result.units.len(), 1);
        assert_eq!(result.units[0].content, "A single chunk of text.");
    }
}
