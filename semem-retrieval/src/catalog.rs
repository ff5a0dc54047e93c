//! The label/type/edge universe the Dual Retriever's exact-match and PPR
//! stages need (`spec.md` §4.H steps 2 and 4). The Graph Store stores an
//! Element's labels and sub-type inside its `extra` triple as an opaque
//! JSON blob (`semem_rdf::triple::element_to_triples`), so looking either
//! up by pattern-matching raw triples isn't workable; instead the
//! Ingestion Pipeline (or any other caller that has the materialized
//! `Entity`/`Attribute`/`Relationship` structs) hands the Dual Retriever a
//! [`RetrievalCatalog`] snapshot built directly from them.

use std::collections::HashMap;

use semem_rdf::entities::{normalize_label, Attribute, Entity, Relationship};

/// Element kind tag carried alongside a retrieval hit, independent of
/// `semem_rdf::element::ElementType` so this crate doesn't need to depend
/// on every Ragno variant, only the three §4.H actually ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogType {
    Entity,
    Attribute,
    Relationship,
}

impl CatalogType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "Entity",
            Self::Attribute => "Attribute",
            Self::Relationship => "Relationship",
        }
    }
}

/// A snapshot of the label index, type map, and Relationship edge list the
/// Dual Retriever needs (`spec.md` §4.H steps 2 and 4). Rebuilt wholesale
/// by the caller whenever the underlying Entities/Attributes/Relationships
/// change; there is no incremental update path, matching how `GraphView`
/// (`semem_algo::graph_view`) is always rebuilt fresh per algorithm run.
#[derive(Debug, Clone, Default)]
pub struct RetrievalCatalog {
    /// Normalized label -> URIs sharing it (`spec.md` §4.H step 2: "case
    /// insensitive, punctuation stripped").
    labels: HashMap<String, Vec<String>>,
    element_types: HashMap<String, CatalogType>,
    /// `(source, target, weight)` for the PPR graph view (`spec.md` §4.H
    /// step 4: "seeded PPR over the Relationship graph").
    relationship_edges: Vec<(String, String, f64)>,
    entity_uris: Vec<String>,
}

impl RetrievalCatalog {
    #[must_use]
    pub fn build(entities: &[Entity], attributes: &[Attribute], relationships: &[Relationship]) -> Self {
        let mut labels: HashMap<String, Vec<String>> = HashMap::new();
        let mut element_types = HashMap::new();
        let mut entity_uris = Vec::with_capacity(entities.len());

        for entity in entities {
            entity_uris.push(entity.base.uri.clone());
            element_types.insert(entity.base.uri.clone(), CatalogType::Entity);
            labels.entry(entity.normalized_label()).or_default().push(entity.base.uri.clone());
            for alt in &entity.alt_labels {
                labels.entry(normalize_label(alt)).or_default().push(entity.base.uri.clone());
            }
        }

        for attribute in attributes {
            element_types.insert(attribute.base.uri.clone(), CatalogType::Attribute);
            labels.entry(normalize_label(&attribute.category)).or_default().push(attribute.base.uri.clone());
        }

        let mut relationship_edges = Vec::with_capacity(relationships.len());
        for relationship in relationships {
            element_types.insert(relationship.base.uri.clone(), CatalogType::Relationship);
            relationship_edges.push((relationship.source_entity.clone(), relationship.target_entity.clone(), relationship.weight));
        }

        for vec in labels.values_mut() {
            vec.sort();
            vec.dedup();
        }

        Self { labels, element_types, relationship_edges, entity_uris }
    }

    /// URIs whose normalized label or alt-label set matches `token`
    /// (`spec.md` §4.H step 2).
    #[must_use]
    pub fn exact_match(&self, token: &str) -> &[String] {
        self.labels.get(&normalize_label(token)).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn element_type(&self, uri: &str) -> Option<CatalogType> {
        self.element_types.get(uri).copied()
    }

    #[must_use]
    pub fn entity_uris(&self) -> &[String] {
        &self.entity_uris
    }

    #[must_use]
    pub fn relationship_edges(&self) -> &[(String, String, f64)] {
        &self.relationship_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(uri: &str, label: &str) -> Entity {
        let mut e = Entity::new(uri, "g1", label, "corpus");
        e.base = e.base.with_uri(uri);
        e
    }

    #[test]
    fn exact_match_is_case_and_punctuation_insensitive() {
        let e = entity("urn:e1", "Geoffrey Hinton");
        let catalog = RetrievalCatalog::build(&[e], &[], &[]);
        assert_eq!(catalog.exact_match("geoffrey, hinton!"), ["urn:e1"]);
    }

    #[test]
    fn alt_labels_are_indexed_too() {
        let e = entity("urn:e1", "Geoffrey Hinton").with_alt_label("Godfather of AI");
        let catalog = RetrievalCatalog::build(&[e], &[], &[]);
        assert_eq!(catalog.exact_match("godfather of ai"), ["urn:e1"]);
    }

    #[test]
    fn unknown_token_yields_no_matches() {
        let catalog = RetrievalCatalog::build(&[], &[], &[]);
        assert!(catalog.exact_match("nobody").is_empty());
    }
}
