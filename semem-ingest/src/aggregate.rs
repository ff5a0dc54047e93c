//! `aggregate` (`spec.md` §4.K step 3): run Leiden community detection and
//! persist one `CommunityElement` per community with an LLM-generated
//! summary. Grounded on `semem_algo::leiden::leiden_communities`.

use std::collections::HashMap;
use std::sync::Arc;

use semem_algo::graph_view::GraphView;
use semem_algo::leiden::{leiden_communities, LeidenConfig};
use semem_config::GraphAlgoConfig;
use semem_core::providers::{ChatMessage, ChatProvider, ChatRequest};
use semem_rdf::entities::{CommunityElement, Entity, Relationship};
use tracing::{instrument, warn};

use crate::dedup::DedupTracker;
use crate::prompt::{community_system_prompt, community_user_prompt};
use crate::types::AggregateResult;

pub struct Aggregator {
    chat_provider: Arc<dyn ChatProvider>,
    chat_model: String,
    graph_algo: GraphAlgoConfig,
}

impl Aggregator {
    #[must_use]
    pub fn new(chat_provider: Arc<dyn ChatProvider>, chat_model: impl Into<String>, graph_algo: GraphAlgoConfig) -> Self {
        Self { chat_provider, chat_model: chat_model.into(), graph_algo }
    }

    #[instrument(skip(self, entities, relationships, dedup))]
    pub async fn aggregate(&self, base_uri: &str, graph: &str, entities: &[Entity], relationships: &[Relationship], dedup: &mut DedupTracker) -> AggregateResult {
        let node_uris = entities.iter().map(|e| e.base.uri.clone());
        let edges = relationships.iter().map(|r| (r.source_entity.clone(), r.target_entity.clone(), r.weight));
        let view = GraphView::new(node_uris, edges);

        let leiden_config = LeidenConfig {
            resolution: self.graph_algo.leiden_resolution,
            min_community_size: self.graph_algo.leiden_min_community_size,
            iteration_cap: self.graph_algo.iteration_cap,
        };
        let leiden_result = leiden_communities(&view, &leiden_config).result;

        let label_of: HashMap<&str, &str> = entities.iter().map(|e| (e.base.uri.as_str(), e.pref_label.as_str())).collect();
        let mut members_by_community: HashMap<String, Vec<String>> = HashMap::new();
        for (uri, community_id) in &leiden_result.community_of {
            members_by_community.entry(community_id.clone()).or_default().push(uri.clone());
        }

        let mut communities = Vec::new();
        for (community_id, mut member_uris) in members_by_community {
            if member_uris.len() < self.graph_algo.leiden_min_community_size {
                continue;
            }
            member_uris.sort();

            let hash = semem_core::fingerprint::content_hash(&format!("{community_id}:{}", member_uris.join(",")));
            if !dedup.observe_content_hash(hash) {
                continue;
            }

            let member_labels: Vec<String> = member_uris.iter().map(|uri| label_of.get(uri.as_str()).copied().unwrap_or(uri.as_str()).to_string()).collect();
            let summary = self.summarize(&member_labels).await;
            communities.push(CommunityElement::new(base_uri, graph, summary, member_uris, "leiden"));
        }

        AggregateResult { communities }
    }

    async fn summarize(&self, member_labels: &[String]) -> String {
        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: community_system_prompt() },
                ChatMessage { role: "user".to_string(), content: community_user_prompt(member_labels) },
            ],
            temperature: Some(0.0),
        };
        match self.chat_provider.chat(request).await {
            Ok(response) if !response.text.trim().is_empty() => response.text,
            Ok(_) => format!("Community of {}", member_labels.join(", ")),
            Err(err) => {
                warn!(error = %err, "community-summary provider call failed, using a generated fallback summary");
                format!("Community of {}", member_labels.join(", "))
            }
        }
    }
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
    async fn connected_entities_form_one_community() {
        let aggregator = Aggregator::new(Arc::new(FixedProvider("a close pair of collaborators")), "local-default", GraphAlgoConfig { leiden_min_community_size: 2, ..GraphAlgoConfig::default() });
        let mut dedup = DedupTracker::new();
        let entities = vec![entity("urn:e1", "alice"), entity("urn:e2", "bob")];
        let relationships = vec![Relationship::new("urn:test", "g1", "urn:e1", "urn:e2", "knows").with_weight(1.0)];
        let result = aggregator.aggregate("urn:test", "g1", &entities, &relationships, &mut dedup).await;
        assert_eq!(result.communities.len(), 1);
        assert_eq!(result.communities[0].member_uris.len(), 2);
    }

    #[tokio::test]
    async fn rerunning_aggregate_is_idempotent() {
        let aggregator = Aggregator::new(Arc::new(FixedProvider("summary")), "local-default", GraphAlgoConfig { leiden_min_community_size: 2, ..GraphAlgoConfig::default() });
        let mut dedup = DedupTracker::new();
        let entities = vec![entity("urn:e1", "alice"), entity("urn:e2", "bob")];
        let relationships = vec![Relationship::new("urn:test", "g1", "urn:e1", "urn:e2", "knows").with_weight(1.0)];
        aggregator.aggregate("urn:test", "g1", &entities, &relationships, &mut dedup).await;
        let second = aggregator.aggregate("urn:test", "g1", &entities, &relationships, &mut dedup).await;
        assert!(second.communities.is_empty());
    }
}
