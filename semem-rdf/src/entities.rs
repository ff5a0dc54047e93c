//! Concrete Ragno Element kinds (`spec.md` §3): `Entity`, `Relationship`,
//! `SemanticUnit`, `Attribute`, `TextElement`, `CommunityElement`,
//! `IndexElement`. Each wraps an [`ElementBase`] and adds its typed fields,
//! following the builder-style `with_*` methods of
//! `llmspell-graph::types::Entity`/`Relationship` generalized to the full
//! Ragno type set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::element::{Element, ElementBase, ElementType, PropertyValue};

/// A named knowledge anchor (`spec.md` §3 Entity).
///
/// Invariant: `pref_label` non-empty; `uri` unique within the owning graph
/// (enforced by [`crate::validation::validate_element`], not here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub base: ElementBase,
    pub pref_label: String,
    pub alt_labels: Vec<String>,
    pub is_entry_point: bool,
    pub frequency: u64,
    pub last_seen: DateTime<Utc>,
    pub sub_type: Option<String>,
    pub corpus: String,
}

impl Entity {
    #[must_use]
    pub fn new(base_uri: &str, owning_graph: impl Into<String>, pref_label: impl Into<String>, corpus: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            base: ElementBase::new(base_uri, ElementType::Entity, owning_graph),
            pref_label: pref_label.into(),
            alt_labels: Vec::new(),
            is_entry_point: false,
            frequency: 0,
            last_seen: now,
            sub_type: None,
            corpus: corpus.into(),
        }
    }

    #[must_use]
    pub fn with_alt_label(mut self, label: impl Into<String>) -> Self {
        self.alt_labels.push(label.into());
        self
    }

    #[must_use]
    pub fn as_entry_point(mut self) -> Self {
        self.is_entry_point = true;
        self
    }

    #[must_use]
    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    /// Normalized label used for dedup-by-label during ingestion
    /// (`spec.md` §4.K step 2).
    #[must_use]
    pub fn normalized_label(&self) -> String {
        normalize_label(&self.pref_label)
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.frequency += 1;
        self.last_seen = at;
    }
}

/// Lowercase, punctuation-stripped label normalization shared by Entity
/// dedup (§4.K) and exact-match lookup (§4.H step 2).
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Element for Entity {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn required_properties(&self) -> &'static [&'static str] {
        &[]
    }

    fn extra(&self) -> JsonValue {
        serde_json::json!({
            "prefLabel": self.pref_label,
            "altLabels": self.alt_labels,
            "isEntryPoint": self.is_entry_point,
            "frequency": self.frequency,
            "subType": self.sub_type,
            "corpus": self.corpus,
        })
    }
}

/// A Relationship is a node, not an edge (`spec.md` §3).
///
/// Invariant: both `source_entity` and `target_entity` must resolve to
/// existing Entities in the same graph — enforced by the Graph Store /
/// Ingestion Pipeline at insert time, not representable structurally here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub base: ElementBase,
    pub source_entity: String,
    pub target_entity: String,
    pub relationship_type: String,
    pub weight: f64,
    pub description: Option<String>,
    pub evidence: Vec<String>,
}

/// Default weight applied when a caller omits one at ingest (`SPEC_FULL.md`
/// Open Questions: "optional at ingest, required at persistence").
pub const DEFAULT_RELATIONSHIP_WEIGHT: f64 = 1.0;

impl Relationship {
    #[must_use]
    pub fn new(
        base_uri: &str,
        owning_graph: impl Into<String>,
        source_entity: impl Into<String>,
        target_entity: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            base: ElementBase::new(base_uri, ElementType::Relationship, owning_graph),
            source_entity: source_entity.into(),
            target_entity: target_entity.into(),
            relationship_type: relationship_type.into(),
            weight: DEFAULT_RELATIONSHIP_WEIGHT,
            description: None,
            evidence: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence_uri: impl Into<String>) -> Self {
        self.evidence.push(evidence_uri.into());
        self
    }
}

impl Element for Relationship {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn required_properties(&self) -> &'static [&'static str] {
        &[]
    }

    fn referenced_uris(&self) -> Vec<String> {
        vec![self.source_entity.clone(), self.target_entity.clone()]
    }

    fn extra(&self) -> JsonValue {
        serde_json::json!({
            "sourceEntity": self.source_entity,
            "targetEntity": self.target_entity,
            "relationshipType": self.relationship_type,
            "weight": self.weight,
            "description": self.description,
            "evidence": self.evidence,
        })
    }
}

/// A mention of an Entity within a `SemanticUnit`, with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    pub entity_uri: String,
    pub relevance: f64,
}

/// A self-contained event/sentence-group extracted from source text
/// (`spec.md` §3 SemanticUnit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticUnit {
    pub base: ElementBase,
    pub content: String,
    pub summary: Option<String>,
    pub source_document: String,
    pub offset_start: usize,
    pub offset_end: usize,
    pub embedding: Option<Vec<f32>>,
    pub entity_mentions: Vec<EntityMention>,
}

impl SemanticUnit {
    #[must_use]
    pub fn new(
        base_uri: &str,
        owning_graph: impl Into<String>,
        content: impl Into<String>,
        source_document: impl Into<String>,
        offset_start: usize,
        offset_end: usize,
    ) -> Self {
        Self {
            base: ElementBase::new(base_uri, ElementType::SemanticUnit, owning_graph),
            content: content.into(),
            summary: None,
            source_document: source_document.into(),
            offset_start,
            offset_end,
            embedding: None,
            entity_mentions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn mention(&mut self, entity_uri: impl Into<String>, relevance: f64) {
        self.entity_mentions.push(EntityMention {
            entity_uri: entity_uri.into(),
            relevance: relevance.clamp(0.0, 1.0),
        });
    }
}

impl Element for SemanticUnit {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn required_properties(&self) -> &'static [&'static str] {
        &[]
    }

    fn referenced_uris(&self) -> Vec<String> {
        self.entity_mentions.iter().map(|m| m.entity_uri.clone()).collect()
    }

    fn extra(&self) -> JsonValue {
        serde_json::json!({
            "content": self.content,
            "summary": self.summary,
            "sourceDocument": self.source_document,
            "offsetStart": self.offset_start,
            "offsetEnd": self.offset_end,
            "entityMentions": self.entity_mentions.iter().map(|m| serde_json::json!({"entityUri": m.entity_uri, "relevance": m.relevance})).collect::<Vec<_>>(),
        })
    }
}

/// A property of an Entity derived from surrounding Units/Relationships
/// (`spec.md` §3 Attribute).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub base: ElementBase,
    pub entity_uri: String,
    pub category: String,
    pub content: String,
    pub confidence: f64,
    pub embedding: Option<Vec<f32>>,
}

impl Attribute {
    #[must_use]
    pub fn new(
        base_uri: &str,
        owning_graph: impl Into<String>,
        entity_uri: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            base: ElementBase::new(base_uri, ElementType::Attribute, owning_graph),
            entity_uri: entity_uri.into(),
            category: category.into(),
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

impl Element for Attribute {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn required_properties(&self) -> &'static [&'static str] {
        &[]
    }

    fn referenced_uris(&self) -> Vec<String> {
        vec![self.entity_uri.clone()]
    }

    fn extra(&self) -> JsonValue {
        serde_json::json!({
            "entityUri": self.entity_uri,
            "category": self.category,
            "content": self.content,
            "confidence": self.confidence,
        })
    }
}

/// Raw text chunk, addressed by content hash (`spec.md` §3 TextElement).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    pub base: ElementBase,
    pub content_hash: String,
    pub raw_text: String,
    pub derived_unit_uris: Vec<String>,
}

impl TextElement {
    #[must_use]
    pub fn new(base_uri: &str, owning_graph: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let content_hash = semem_core::fingerprint::content_hash(&raw_text);
        Self {
            base: ElementBase::new(base_uri, ElementType::TextElement, owning_graph).with_property(
                "contentHash",
                PropertyValue::String(content_hash.clone()),
            ),
            content_hash,
            raw_text,
            derived_unit_uris: Vec::new(),
        }
    }

    pub fn link_unit(&mut self, unit_uri: impl Into<String>) {
        self.derived_unit_uris.push(unit_uri.into());
    }
}

impl Element for TextElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn referenced_uris(&self) -> Vec<String> {
        self.derived_unit_uris.clone()
    }

    fn extra(&self) -> JsonValue {
        serde_json::json!({
            "contentHash": self.content_hash,
            "derivedUnitUris": self.derived_unit_uris,
        })
    }
}

/// An LLM-generated summary of a community of Elements (`spec.md` §3
/// CommunityElement).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityElement {
    pub base: ElementBase,
    pub summary: String,
    pub member_uris: Vec<String>,
    pub algorithm: String,
}

impl CommunityElement {
    #[must_use]
    pub fn new(
        base_uri: &str,
        owning_graph: impl Into<String>,
        summary: impl Into<String>,
        member_uris: Vec<String>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            base: ElementBase::new(base_uri, ElementType::CommunityElement, owning_graph),
            summary: summary.into(),
            member_uris,
            algorithm: algorithm.into(),
        }
    }
}

impl Element for CommunityElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn referenced_uris(&self) -> Vec<String> {
        self.member_uris.clone()
    }

    fn extra(&self) -> JsonValue {
        serde_json::json!({
            "summary": self.summary,
            "memberUris": self.member_uris,
            "algorithm": self.algorithm,
        })
    }
}

/// Bookkeeping Element recording that some other Element's embedding is
/// present in the Vector Index (`spec.md` §2 names `IndexElement` in the
/// type enum but does not detail its fields; this is the minimal shape a
/// reconciliation pass (`SPEC_FULL.md` §4.D "Supplemented features") needs
/// to detect drift between the Graph Store and the Vector Index).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexElement {
    pub base: ElementBase,
    pub indexed_uri: String,
    pub dimension: usize,
    pub indexed_at: DateTime<Utc>,
}

impl IndexElement {
    #[must_use]
    pub fn new(base_uri: &str, owning_graph: impl Into<String>, indexed_uri: impl Into<String>, dimension: usize) -> Self {
        Self {
            base: ElementBase::new(base_uri, ElementType::IndexElement, owning_graph),
            indexed_uri: indexed_uri.into(),
            dimension,
            indexed_at: Utc::now(),
        }
    }
}

impl Element for IndexElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn referenced_uris(&self) -> Vec<String> {
        vec![self.indexed_uri.clone()]
    }

    fn extra(&self) -> JsonValue {
        serde_json::json!({
            "indexedUri": self.indexed_uri,
            "dimension": self.dimension,
            "indexedAt": self.indexed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_punctuation_and_case() {
        assert_eq!(normalize_label("Geoffrey Hinton!"), "geoffrey hinton");
        assert_eq!(normalize_label("  multi   space "), "multi space");
    }

    #[test]
    fn relationship_weight_clamped_to_unit_interval() {
        let rel = Relationship::new("urn:test", "g1", "e1", "e2", "inventedBy").with_weight(5.0);
        assert_eq!(rel.weight, 1.0);
    }

    #[test]
    fn relationship_defaults_to_full_weight() {
        let rel = Relationship::new("urn:test", "g1", "e1", "e2", "inventedBy");
        assert_eq!(rel.weight, DEFAULT_RELATIONSHIP_WEIGHT);
    }

    #[test]
    fn text_element_hash_is_deterministic() {
        let a = TextElement::new("urn:test", "g1", "hello world");
        let b = TextElement::new("urn:test", "g1", "hello world");
        assert_eq!(a.content_hash, b.content_hash);
    }
}
