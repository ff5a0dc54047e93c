//! ZPT Navigator: the top-level orchestrator tying the Parameter
//! Processor, Selector, Projector, and Transformer into the single
//! `navigate` entry point external collaborators call
//! (`spec.md` §6 implies a `zpt.navigate` operation alongside the other
//! façade bindings).

use std::sync::Arc;
use std::time::Duration;

use semem_algo::pagerank::PprConfig;
use semem_config::ZptConfig;
use semem_core::providers::EmbeddingProvider;
use semem_vector::index::VectorIndex;
use tracing::instrument;

use crate::cache::SelectionCache;
use crate::catalog::ZptCatalog;
use crate::error::{Result, ZptError};
use crate::params::{NavigationParams, RawNavigationParams};
use crate::projector::{self, Projection};
use crate::selection::{SelectionResult, Selector};
use crate::transformer::{self, NavigationSummary, TransformResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationDiagnostics {
    pub cache_hit: bool,
    pub selected_count: usize,
}

pub struct NavigationOutcome {
    pub params: NavigationParams,
    pub selection: SelectionResult,
    pub projection: Projection,
    pub transform: TransformResult,
    pub diagnostics: NavigationDiagnostics,
}

pub struct Navigator {
    selector: Selector,
    cache: SelectionCache,
    config: ZptConfig,
}

impl Navigator {
    #[must_use]
    pub fn new(vector_index: Arc<VectorIndex>, embedding_provider: Arc<dyn EmbeddingProvider>, ppr_config: PprConfig, config: ZptConfig) -> Self {
        let cache = SelectionCache::new(Duration::from_secs(config.selection_cache_ttl_secs));
        Self { selector: Selector::new(vector_index, embedding_provider, ppr_config), cache, config }
    }

    /// `spec.md` §4.J: validate+normalize -> fingerprint -> cache check ->
    /// select -> project -> transform.
    #[instrument(skip(self, raw, catalog))]
    pub async fn navigate(&self, raw: &RawNavigationParams, catalog: &ZptCatalog) -> Result<NavigationOutcome> {
        let params = crate::params::validate_and_normalize(raw, &self.config).map_err(ZptError::InvalidParameters)?;
        let fingerprint = params.fingerprint();

        let (selection, cache_hit) = match self.cache.get(&fingerprint) {
            Some(cached) => (cached, true),
            None => {
                let selection = self.selector.select(&params, catalog).await;
                self.cache.put(fingerprint, selection.clone());
                (selection, false)
            }
        };

        let generated_at = catalog_generation_time(catalog);
        let projection = projector::project(&selection.items, params.transform.format, params.tilt, generated_at);

        let nav_summary = NavigationSummary { zoom: params.zoom, pan: params.pan.clone(), tilt: params.tilt, counts_by_type: selection.counts_by_type.clone() };
        let stage_timeout = Duration::from_millis(self.config.stage_timeout_ms);
        let transform_result = transformer::transform(&projection.body, &params.transform, &nav_summary, stage_timeout).await;

        let diagnostics = NavigationDiagnostics { cache_hit, selected_count: selection.items.len() };
        Ok(NavigationOutcome { params, selection, projection, transform: transform_result, diagnostics })
    }
}

/// The catalog carries no wall-clock itself; newest element timestamp
/// stands in for "when this snapshot was generated" so `navigate` never
/// needs to read the clock directly (`Date.now()`-style calls are not
/// available to every caller of this workspace).
fn catalog_generation_time(catalog: &ZptCatalog) -> chrono::DateTime<chrono::Utc> {
    catalog.elements_for(crate::params::Zoom::Corpus).into_iter().map(|e| e.timestamp).max().unwrap_or_else(chrono::Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ZptElement;
    use crate::params::Zoom;
    use semem_providers::mock::DeterministicEmbeddingProvider;
    use semem_vector::index::IndexParams;

    fn navigator() -> Navigator {
        let vector_index = Arc::new(VectorIndex::new(IndexParams { dimension: 8, ..Default::default() }));
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(DeterministicEmbeddingProvider::new(8));
        Navigator::new(vector_index, embedding_provider, PprConfig::default(), ZptConfig::default())
    }

    fn catalog() -> ZptCatalog {
        ZptCatalog::new(
            vec![ZptElement {
                uri: "urn:e1".to_string(),
                zoom: Zoom::Entity,
                text: "alice works at acme".to_string(),
                timestamp: chrono::Utc::now(),
                entity_refs: vec![],
                coordinates: None,
            }],
            vec![],
        )
    }

    #[tokio::test]
    async fn navigate_returns_items_and_a_miss_on_first_call() {
        let navigator = navigator();
        let raw = RawNavigationParams { zoom: Some("entity".to_string()), ..Default::default() };
        let outcome = navigator.navigate(&raw, &catalog()).await.unwrap();
        assert!(!outcome.diagnostics.cache_hit);
        assert_eq!(outcome.selection.items.len(), 1);
    }

    #[tokio::test]
    async fn second_identical_navigate_hits_the_cache() {
        let navigator = navigator();
        let raw = RawNavigationParams { zoom: Some("entity".to_string()), ..Default::default() };
        navigator.navigate(&raw, &catalog()).await.unwrap();
        let outcome = navigator.navigate(&raw, &catalog()).await.unwrap();
        assert!(outcome.diagnostics.cache_hit);
    }

    #[tokio::test]
    async fn invalid_zoom_is_rejected() {
        let navigator = navigator();
        let raw = RawNavigationParams { zoom: Some("not-a-zoom".to_string()), ..Default::default() };
        let err = navigator.navigate(&raw, &catalog()).await.unwrap_err();
        assert!(matches!(err, ZptError::InvalidParameters(_)));
    }
}
