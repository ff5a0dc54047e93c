//! `augment` (`spec.md` §4.K step 2): select important Entities by k-core,
//! gather their incident Units/Relationships as context, and prompt the
//! LLM for an Attribute summary per entity. Grounded on
//! `semem_algo::kcore::k_core_decomposition` for "important" selection and
//! `semem_concepts::extractor`'s provider-call-then-lenient-parse shape for
//! the summarization call itself.

use std::sync::Arc;

use semem_algo::graph_view::GraphView;
use semem_algo::kcore::k_core_decomposition;
use semem_config::{GraphAlgoConfig, IngestConfig};
use semem_core::providers::{ChatMessage, ChatProvider, ChatRequest};
use semem_rdf::entities::{Attribute, Entity, Relationship, SemanticUnit};
use tracing::{instrument, warn};

use crate::dedup::DedupTracker;
use crate::prompt::{attribute_system_prompt, attribute_user_prompt};
use crate::types::AugmentResult;
use crate::units::parse_attribute;

pub struct Augmenter {
    chat_provider: Arc<dyn ChatProvider>,
    config: IngestConfig,
    graph_algo: GraphAlgoConfig,
}

impl Augmenter {
    #[must_use]
    pub fn new(chat_provider: Arc<dyn ChatProvider>, config: IngestConfig, graph_algo: GraphAlgoConfig) -> Self {
        Self { chat_provider, config, graph_algo }
    }

    /// `spec.md` §4.K `augment(graph)`. `entities`/`relationships` are the
    /// graph projection to compute k-core over; `units` supplies the
    /// mention context gathered for each important entity's summary
    /// prompt.
    #[instrument(skip(self, entities, relationships, units, dedup))]
    pub async fn augment(
        &self,
        base_uri: &str,
        graph: &str,
        entities: &[Entity],
        relationships: &[Relationship],
        units: &[SemanticUnit],
        dedup: &mut DedupTracker,
    ) -> AugmentResult {
        let node_uris = entities.iter().map(|e| e.base.uri.clone());
        let edges = relationships.iter().map(|r| (r.source_entity.clone(), r.target_entity.clone(), r.weight));
        let view = GraphView::new(node_uris, edges);
        let core = k_core_decomposition(&view, self.graph_algo.iteration_cap).result;

        let mut attributes = Vec::new();
        for entity in entities {
            let core_number = core.get(&entity.base.uri).copied().unwrap_or(0);
            if core_number < self.config.augment_kcore_threshold {
                continue;
            }

            let context = gather_context(entity, relationships, units, entities);
            if context.trim().is_empty() {
                continue;
            }

            let Some((category, summary)) = self.summarize(&entity.pref_label, &context).await else { continue };
            let hash = semem_core::fingerprint::content_hash(&format!("{}:{category}:{summary}", entity.base.uri));
            if !dedup.observe_content_hash(hash) {
                continue;
            }

            attributes.push(Attribute::new(base_uri, graph, entity.base.uri.clone(), category, summary, 0.8));
        }

        AugmentResult { attributes }
    }

    async fn summarize(&self, entity_label: &str, context: &str) -> Option<(String, String)> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: attribute_system_prompt() },
                ChatMessage { role: "user".to_string(), content: attribute_user_prompt(entity_label, context) },
            ],
            temperature: Some(0.0),
        };
        match self.chat_provider.chat(request).await {
            Ok(response) => parse_attribute(&response.text),
            Err(err) => {
                warn!(error = %err, entity = entity_label, "attribute-summary provider call failed, skipping entity");
                None
            }
        }
    }
}

fn gather_context(entity: &Entity, relationships: &[Relationship], units: &[SemanticUnit], entities: &[Entity]) -> String {
    let label_of: std::collections::HashMap<&str, &str> = entities.iter().map(|e| (e.base.uri.as_str(), e.pref_label.as_str())).collect();

    let mut parts = Vec::new();
    for unit in units {
        if unit.entity_mentions.iter().any(|m| m.entity_uri == entity.base.uri) {
            parts.push(unit.content.clone());
        }
    }
    for relationship in relationships {
        if relationship.source_entity == entity.base.uri || relationship.target_entity == entity.base.uri {
            let source = label_of.get(relationship.source_entity.as_str()).copied().unwrap_or(&relationship.source_entity);
            let target = label_of.get(relationship.target_entity.as_str()).copied().unwrap_or(&relationship.target_entity);
            parts.push(format!("{source} {} {target}", relationship.relationship_type));
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semem_core::error::Result as CoreResult;
    use semem_core::providers::ChatResponse;

    struct FixedProvider(&'static str);

    #[async_trait]
    impl ChatProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn chat(&self, _request: ChatRequest) -> CoreResult<ChatResponse> {
            Ok(ChatResponse { text: self.0.to_string() })
        }
    }

    fn entity(uri: &str, label: &str) -> Entity {
        let mut e = Entity::new(uri, "g1", label, "corpus");
        e.base = e.base.with_uri(uri);
        e
    }

    #[tokio::test]
    async fn entities_below_kcore_threshold_are_skipped() {
        let augmenter = Augmenter::new(Arc::new(FixedProvider(r#"{"category":"role","summary":"Alice is an engineer."}"#)), IngestConfig::default(), GraphAlgoConfig::default());
        let mut dedup = DedupTracker::new();
        let entities = vec![entity("urn:e1", "alice")];
        let units = vec![];
        let result = augmenter.augment("urn:test", "g1", &entities, &[], &units, &mut dedup).await;
        assert!(result.attributes.is_empty());
    }

    #[tokio::test]
    async fn important_entity_with_context_gets_an_attribute() {
        let augmenter = Augmenter::new(Arc::new(FixedProvider(r#"{"category":"role","summary":"Alice is an engineer."}"#)), IngestConfig { augment_kcore_threshold: 1, ..IngestConfig::default() }, GraphAlgoConfig::default());
        let mut dedup = DedupTracker::new();
        let entities = vec![entity("urn:e1", "alice"), entity("urn:e2", "acme")];
        let relationships = vec![Relationship::new("urn:test", "g1", "urn:e1", "urn:e2", "works_at")];
        let units = vec![];
        let result = augmenter.augment("urn:test", "g1", &entities, &relationships, &units, &mut dedup).await;
        assert_eq!(result.attributes.len(), 2);
    }
}
