//! The element universe ZPT selection reads from (`spec.md` §4.J step 3:
//! "internal criteria object" evaluated against Entities, `SemanticUnit`s,
//! `TextElement`s, and `CommunityElement`s). Grounded on
//! `semem_retrieval::catalog::RetrievalCatalog`'s caller-supplied-snapshot
//! pattern, generalized from the Dual Retriever's three element kinds to
//! every zoom-addressable Ragno type plus free text for the keywords tilt.

use chrono::{DateTime, Utc};

use crate::params::Zoom;

/// One element ZPT can select, projected down to what the tilts need:
/// a label/summary for text scoring, a timestamp for temporal scans, and
/// optional geo coordinates for the geographic pan filter. Embeddings live
/// in the Vector Index, not here.
#[derive(Debug, Clone)]
pub struct ZptElement {
    pub uri: String,
    pub zoom: Zoom,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub entity_refs: Vec<String>,
    pub coordinates: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct ZptCatalog {
    elements: Vec<ZptElement>,
    /// `(source, target, weight)` Relationship edges over Entity URIs, for
    /// the `graph` tilt's PPR (`spec.md` §4.J step 4: "graph -> PPR").
    relationship_edges: Vec<(String, String, f64)>,
}

impl ZptCatalog {
    #[must_use]
    pub fn new(elements: Vec<ZptElement>, relationship_edges: Vec<(String, String, f64)>) -> Self {
        Self { elements, relationship_edges }
    }

    #[must_use]
    pub fn elements_for(&self, zoom: Zoom) -> Vec<&ZptElement> {
        if zoom == Zoom::Corpus {
            return self.elements.iter().collect();
        }
        self.elements.iter().filter(|e| e.zoom == zoom).collect()
    }

    #[must_use]
    pub fn relationship_edges(&self) -> &[(String, String, f64)] {
        &self.relationship_edges
    }

    #[must_use]
    pub fn entity_uris(&self) -> Vec<String> {
        self.elements.iter().filter(|e| e.zoom == Zoom::Entity).map(|e| e.uri.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(uri: &str, zoom: Zoom, text: &str) -> ZptElement {
        ZptElement { uri: uri.to_string(), zoom, text: text.to_string(), timestamp: Utc::now(), entity_refs: Vec::new(), coordinates: None }
    }

    #[test]
    fn elements_for_corpus_returns_everything() {
        let catalog = ZptCatalog::new(vec![element("urn:e1", Zoom::Entity, "alice"), element("urn:u1", Zoom::Unit, "alice met bob")], vec![]);
        assert_eq!(catalog.elements_for(Zoom::Corpus).len(), 2);
        assert_eq!(catalog.elements_for(Zoom::Entity).len(), 1);
    }
}
