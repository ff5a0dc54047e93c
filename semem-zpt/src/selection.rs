//! ZPT Selector (`spec.md` §4.J "Selection pipeline"): builds an internal
//! criteria object, executes the tilt-specific sub-selection, and
//! post-processes into a capped, deduplicated, scored result set.

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use semem_algo::graph_view::GraphView;
use semem_algo::pagerank::{personalized_pagerank, PprConfig};
use semem_core::providers::EmbeddingProvider;
use semem_rdf::entities::normalize_label;
use semem_vector::index::{TypeFilter, VectorIndex};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{ZptCatalog, ZptElement};
use crate::params::{GeoFilter, NavigationParams, Pan, Tilt, Zoom};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedItem {
    pub uri: String,
    pub text: String,
    pub zoom: Zoom,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionResult {
    pub items: Vec<SelectedItem>,
    pub counts_by_type: HashMap<String, usize>,
}

pub struct Selector {
    vector_index: Arc<VectorIndex>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    ppr_config: PprConfig,
}

impl Selector {
    #[must_use]
    pub fn new(vector_index: Arc<VectorIndex>, embedding_provider: Arc<dyn EmbeddingProvider>, ppr_config: PprConfig) -> Self {
        Self { vector_index, embedding_provider, ppr_config }
    }

    /// `spec.md` §4.J steps 3-5: build criteria implicitly from `params`,
    /// execute the tilt-specific sub-selection, then post-process.
    pub async fn select(&self, params: &NavigationParams, catalog: &ZptCatalog) -> SelectionResult {
        let candidates = catalog.elements_for(params.zoom);
        let restricted: Vec<&ZptElement> = candidates.into_iter().filter(|e| matches_pan(e, &params.pan)).collect();

        let scored: Vec<(String, f64)> = match params.tilt {
            Tilt::Keywords => self.select_keywords(&restricted, &params.pan),
            Tilt::Embedding => self.select_embedding(&restricted, &params.pan, params.zoom).await,
            Tilt::Graph => self.select_graph(&restricted, catalog, &params.pan),
            Tilt::Temporal => Self::select_temporal(&restricted, &params.pan),
        };

        self.post_process(scored, &restricted, params)
    }

    fn select_keywords(&self, elements: &[&ZptElement], pan: &Pan) -> Vec<(String, f64)> {
        let Some(topic) = &pan.topic else {
            return elements.iter().map(|e| (e.uri.clone(), 1.0)).collect();
        };
        tf_idf_score(elements, topic)
    }

    async fn select_embedding(&self, elements: &[&ZptElement], pan: &Pan, zoom: Zoom) -> Vec<(String, f64)> {
        let Some(topic) = &pan.topic else {
            return elements.iter().map(|e| (e.uri.clone(), 1.0)).collect();
        };

        let query_embedding = match self.embedding_provider.embed(&[topic.clone()]).await {
            Ok(mut embeddings) if !embeddings.is_empty() => embeddings.remove(0),
            Ok(_) => {
                warn!("embedding provider returned no vectors for ZPT topic");
                return Vec::new();
            }
            Err(err) => {
                warn!(error = %err, "embedding provider failed, embedding tilt contributes nothing");
                return Vec::new();
            }
        };

        let filter = if zoom == Zoom::Entity { TypeFilter::Entity } else { TypeFilter::All };
        let allowed: std::collections::HashSet<&str> = elements.iter().map(|e| e.uri.as_str()).collect();
        match self.vector_index.search(&query_embedding, elements.len().max(20), filter, None) {
            Ok(hits) => hits.into_iter().filter(|(uri, _)| allowed.contains(uri.as_str())).map(|(uri, score)| (uri, f64::from(score))).collect(),
            Err(err) => {
                warn!(error = %err, "vector index search failed, embedding tilt contributes nothing");
                Vec::new()
            }
        }
    }

    fn select_graph(&self, elements: &[&ZptElement], catalog: &ZptCatalog, pan: &Pan) -> Vec<(String, f64)> {
        let allowed: std::collections::HashSet<&str> = elements.iter().map(|e| e.uri.as_str()).collect();
        let entity_uris = catalog.entity_uris();
        if entity_uris.is_empty() {
            return Vec::new();
        }

        let mut seeds: Vec<String> = pan.entity.clone().unwrap_or_default();
        if let Some(topic) = &pan.topic {
            let normalized_topic = normalize_label(topic);
            seeds.extend(elements.iter().filter(|e| normalize_label(&e.text).contains(&normalized_topic)).map(|e| e.uri.clone()));
        }
        if seeds.is_empty() {
            let mut rng = rand::thread_rng();
            seeds = entity_uris.choose_multiple(&mut rng, entity_uris.len().min(5)).cloned().collect();
        }

        let view = GraphView::new(entity_uris, catalog.relationship_edges().iter().cloned());
        personalized_pagerank(&view, &seeds, &self.ppr_config).result.into_iter().filter(|(uri, _)| allowed.contains(uri.as_str())).collect()
    }

    fn select_temporal(elements: &[&ZptElement], pan: &Pan) -> Vec<(String, f64)> {
        let now = chrono::Utc::now();
        let _ = pan;
        elements
            .iter()
            .map(|e| {
                let age_secs = (now - e.timestamp).num_seconds().max(0) as f64;
                let recency = (-age_secs / 86_400.0).exp();
                (e.uri.clone(), recency)
            })
            .collect()
    }

    fn post_process(&self, scored: Vec<(String, f64)>, elements: &[&ZptElement], params: &NavigationParams) -> SelectionResult {
        let text_of: HashMap<&str, &ZptElement> = elements.iter().map(|e| (e.uri.as_str(), *e)).collect();
        let mut best: HashMap<String, f64> = HashMap::new();
        for (uri, score) in scored {
            let blended = if let Some(topic) = &params.pan.topic {
                if params.tilt == Tilt::Keywords {
                    score
                } else {
                    let overlap = text_of.get(uri.as_str()).map_or(0.0, |e| topic_overlap(&e.text, topic));
                    0.8 * score + 0.2 * overlap
                }
            } else {
                score
            };
            let slot = best.entry(uri).or_insert(f64::MIN);
            if blended > *slot {
                *slot = blended;
            }
        }

        let mut items: Vec<SelectedItem> = best
            .into_iter()
            .filter_map(|(uri, score)| {
                let element = text_of.get(uri.as_str())?;
                Some(SelectedItem { uri, text: element.text.clone(), zoom: element.zoom, score })
            })
            .collect();
        items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.uri.cmp(&b.uri)));

        let per_type_cap = params.zoom.default_result_count();
        let mut counts_by_type: HashMap<String, usize> = HashMap::new();
        items.retain(|item| {
            let key = zoom_label(item.zoom).to_string();
            let count = counts_by_type.entry(key).or_insert(0);
            if *count >= per_type_cap {
                return false;
            }
            *count += 1;
            true
        });

        let total_cap = per_type_cap.saturating_mul(2).max(per_type_cap);
        items.truncate(total_cap);

        SelectionResult { items, counts_by_type }
    }
}

fn matches_pan(element: &ZptElement, pan: &Pan) -> bool {
    if let Some(entities) = &pan.entity {
        let normalized: Vec<String> = entities.iter().map(|e| normalize_label(e)).collect();
        let element_norm = normalize_label(&element.uri);
        let matches_self = normalized.contains(&element_norm);
        let matches_ref = element.entity_refs.iter().any(|r| normalized.contains(&normalize_label(r)));
        if !matches_self && !matches_ref {
            return false;
        }
    }

    if let Some(temporal) = &pan.temporal {
        if let Some(start) = temporal.start {
            if element.timestamp < start {
                return false;
            }
        }
        if let Some(end) = temporal.end {
            if element.timestamp > end {
                return false;
            }
        }
    }

    if let Some(geo) = &pan.geographic {
        let Some((lat, lon)) = element.coordinates else { return false };
        match geo {
            GeoFilter::BoundingBox(bbox) => {
                if lon < bbox.west || lon > bbox.east || lat < bbox.south || lat > bbox.north {
                    return false;
                }
            }
            GeoFilter::Radius { lat: clat, lon: clon, radius_km } => {
                if haversine_km(lat, lon, *clat, *clon) > *radius_km {
                    return false;
                }
            }
        }
    }

    true
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

fn tf_idf_score(elements: &[&ZptElement], topic: &str) -> Vec<(String, f64)> {
    let topic_terms: Vec<String> = normalize_label(topic).split_whitespace().map(str::to_string).collect();
    if topic_terms.is_empty() {
        return elements.iter().map(|e| (e.uri.clone(), 1.0)).collect();
    }

    let docs: Vec<Vec<String>> = elements.iter().map(|e| normalize_label(&e.text).split_whitespace().map(str::to_string).collect()).collect();
    let doc_count = docs.len().max(1) as f64;
    let idf: HashMap<&str, f64> = topic_terms
        .iter()
        .map(|term| {
            let containing = docs.iter().filter(|doc| doc.contains(term)).count() as f64;
            (term.as_str(), (doc_count / (1.0 + containing)).ln() + 1.0)
        })
        .collect();

    elements
        .iter()
        .zip(&docs)
        .map(|(element, doc)| {
            let len = doc.len().max(1) as f64;
            let score: f64 = topic_terms
                .iter()
                .map(|term| {
                    let tf = doc.iter().filter(|w| *w == term).count() as f64 / len;
                    tf * idf.get(term.as_str()).copied().unwrap_or(0.0)
                })
                .sum();
            (element.uri.clone(), score)
        })
        .filter(|(_, score)| *score > 0.0)
        .collect()
}

fn topic_overlap(text: &str, topic: &str) -> f64 {
    let text_terms: std::collections::HashSet<String> = normalize_label(text).split_whitespace().map(str::to_string).collect();
    let topic_terms: Vec<String> = normalize_label(topic).split_whitespace().map(str::to_string).collect();
    if topic_terms.is_empty() {
        return 0.0;
    }
    let matched = topic_terms.iter().filter(|t| text_terms.contains(*t)).count();
    matched as f64 / topic_terms.len() as f64
}

fn zoom_label(zoom: Zoom) -> &'static str {
    match zoom {
        Zoom::Entity => "Entity",
        Zoom::Unit => "SemanticUnit",
        Zoom::Text => "TextElement",
        Zoom::Community => "CommunityElement",
        Zoom::Corpus => "Corpus",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ChunkStrategyKind, OutputFormat, TokenizerKind, TransformOptions};
    use semem_providers::mock::DeterministicEmbeddingProvider;
    use semem_vector::index::IndexParams;

    fn element(uri: &str, zoom: Zoom, text: &str) -> ZptElement {
        ZptElement { uri: uri.to_string(), zoom, text: text.to_string(), timestamp: chrono::Utc::now(), entity_refs: Vec::new(), coordinates: None }
    }

    fn selector() -> Selector {
        let vector_index = Arc::new(VectorIndex::new(IndexParams { dimension: 8, ..Default::default() }));
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(DeterministicEmbeddingProvider::new(8));
        Selector::new(vector_index, embedding_provider, PprConfig::default())
    }

    fn params(zoom: Zoom, tilt: Tilt, topic: Option<&str>) -> NavigationParams {
        NavigationParams {
            zoom,
            pan: Pan { topic: topic.map(str::to_string), ..Default::default() },
            tilt,
            transform: TransformOptions {
                max_tokens: 1000,
                format: OutputFormat::Structured,
                tokenizer: TokenizerKind::Cl100k,
                chunk_strategy: ChunkStrategyKind::Fixed,
                include_metadata: true,
            },
        }
    }

    #[tokio::test]
    async fn keywords_tilt_ranks_by_topic_overlap() {
        let selector = selector();
        let catalog = ZptCatalog::new(
            vec![element("urn:u1", Zoom::Unit, "neural networks are great"), element("urn:u2", Zoom::Unit, "cooking pasta recipes")],
            vec![],
        );
        let result = selector.select(&params(Zoom::Unit, Tilt::Keywords, Some("neural networks")), &catalog).await;
        assert_eq!(result.items[0].uri, "urn:u1");
    }

    #[tokio::test]
    async fn temporal_tilt_prefers_recent_elements() {
        let selector = selector();
        let mut old = element("urn:old", Zoom::Unit, "old");
        old.timestamp = chrono::Utc::now() - chrono::Duration::days(30);
        let fresh = element("urn:new", Zoom::Unit, "new");
        let catalog = ZptCatalog::new(vec![old, fresh], vec![]);
        let result = selector.select(&params(Zoom::Unit, Tilt::Temporal, None), &catalog).await;
        assert_eq!(result.items[0].uri, "urn:new");
    }

    #[tokio::test]
    async fn per_type_cap_truncates_results() {
        let selector = selector();
        let elements: Vec<ZptElement> = (0..30).map(|i| element(&format!("urn:e{i}"), Zoom::Entity, "alice")).collect();
        let catalog = ZptCatalog::new(elements, vec![]);
        let result = selector.select(&params(Zoom::Entity, Tilt::Keywords, None), &catalog).await;
        assert_eq!(result.items.len(), Zoom::Entity.default_result_count());
    }
}
