//! Common base every RDF Element derives from (`spec.md` §4.B: "All
//! Elements derive from a common base carrying `{uri, type, creation-time,
//! owning-graph, properties}`"). Grounded on `llmspell-graph::types::Entity`
//! / `Relationship` (bi-temporal fields, builder-style `with_*` methods,
//! `Uuid`-backed id generation), generalized from two concrete node types to
//! the seven Ragno Element kinds `spec.md` §2/§3 names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The Ragno element type a node belongs to (`spec.md` §2 component B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Entity,
    Relationship,
    SemanticUnit,
    Attribute,
    TextElement,
    CommunityElement,
    IndexElement,
}

impl ElementType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "Entity",
            Self::Relationship => "Relationship",
            Self::SemanticUnit => "SemanticUnit",
            Self::Attribute => "Attribute",
            Self::TextElement => "TextElement",
            Self::CommunityElement => "CommunityElement",
            Self::IndexElement => "IndexElement",
        }
    }
}

/// A property value: either a typed literal or a reference to another
/// Element's URI (`spec.md` §4.B: "values are literals (typed) or URIs").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Uri(String),
}

impl PropertyValue {
    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(u) => Some(u),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Literal datatype IRI for RDF serialization (XSD where applicable).
    #[must_use]
    pub fn xsd_datatype(&self) -> Option<&'static str> {
        match self {
            Self::Integer(_) => Some("http://www.w3.org/2001/XMLSchema#integer"),
            Self::Float(_) => Some("http://www.w3.org/2001/XMLSchema#double"),
            Self::Bool(_) => Some("http://www.w3.org/2001/XMLSchema#boolean"),
            Self::DateTime(_) => Some("http://www.w3.org/2001/XMLSchema#dateTime"),
            Self::String(_) | Self::Uri(_) => None,
        }
    }

    #[must_use]
    pub fn literal_lexical(&self) -> String {
        match self {
            Self::String(s) | Self::Uri(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => dt.to_rfc3339(),
        }
    }
}

/// Fields every Element carries regardless of type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementBase {
    pub uri: String,
    pub element_type: ElementType,
    /// When the real-world fact/event occurred, if known. Supplements
    /// `spec.md` §3 (which specifies this only for Entity) to every
    /// Element type, per `SPEC_FULL.md`'s bi-temporal generalization.
    pub event_time: Option<DateTime<Utc>>,
    /// When this Element was learned/ingested; always present.
    pub creation_time: DateTime<Utc>,
    pub owning_graph: String,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl ElementBase {
    #[must_use]
    pub fn new(base: &str, element_type: ElementType, owning_graph: impl Into<String>) -> Self {
        Self {
            uri: format!("{base}/{}/{}", element_type.as_str().to_lowercase(), Uuid::new_v4()),
            element_type,
            event_time: None,
            creation_time: Utc::now(),
            owning_graph: owning_graph.into(),
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_event_time(mut self, time: DateTime<Utc>) -> Self {
        self.event_time = Some(time);
        self
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Anything that carries an [`ElementBase`] — the common surface the Graph
/// Store, serializers, and validators operate on without knowing the
/// concrete Ragno type.
pub trait Element {
    fn base(&self) -> &ElementBase;

    fn uri(&self) -> &str {
        &self.base().uri
    }

    fn element_type(&self) -> ElementType {
        self.base().element_type
    }

    /// Required property keys for this concrete type, used by
    /// [`crate::validation::validate_element`].
    fn required_properties(&self) -> &'static [&'static str] {
        &[]
    }

    /// URIs of other Elements this one non-owningly references (used for
    /// dangling-reference validation, `spec.md` §3/§4.B).
    fn referenced_uris(&self) -> Vec<String> {
        Vec::new()
    }

    /// Arbitrary extra JSON payload not modeled as typed properties
    /// (default empty; concrete types override where useful, e.g. Entity's
    /// free-form sub-type metadata).
    fn extra(&self) -> JsonValue {
        JsonValue::Null
    }
}
