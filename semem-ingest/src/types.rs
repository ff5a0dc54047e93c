//! Result shapes for the four Ingestion Pipeline stages (`spec.md` §4.K).

use semem_rdf::entities::{Attribute, CommunityElement, Entity, Relationship, SemanticUnit};

#[derive(Debug, Clone, Default)]
pub struct DecomposeResult {
    pub units: Vec<SemanticUnit>,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default)]
pub struct AugmentResult {
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    pub communities: Vec<CommunityElement>,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichResult {
    pub embedded_count: usize,
    pub similarity_edges: Vec<Relationship>,
}
