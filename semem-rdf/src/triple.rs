//! The triple-level view every Element reduces to for storage and
//! serialization (`spec.md` §4.B/§4.C). Grounded on
//! `samyama-ai-samyama-graph/src/rdf/types.rs`'s `Triple`/`NamedNode`/
//! `Literal` wrappers, simplified to the subset this workspace needs: no
//! blank nodes (every Ragno Element already carries a stable URI).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::{Element, PropertyValue};

/// One namespace for every synthesized predicate IRI this crate emits.
/// `spec.md` doesn't name a concrete namespace; `ragno` matches the Ragno
/// ontology name used throughout `spec.md` §1/§2.
pub const RAGNO_NS: &str = "http://purl.org/stuff/ragno/";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// An RDF object: either a typed literal or a reference to another node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    Iri(String),
    Literal { value: String, datatype: Option<String>, language: Option<String> },
}

impl Object {
    #[must_use]
    pub fn plain_literal(value: impl Into<String>) -> Self {
        Self::Literal { value: value.into(), datatype: None, language: None }
    }

    #[must_use]
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal { value: value.into(), datatype: Some(datatype.into()), language: None }
    }
}

/// A single (subject, predicate, object) statement, content-addressable by
/// its own serialization (`spec.md` §2 component C: "content-addressed
/// triples").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Object,
}

impl Triple {
    #[must_use]
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Object) -> Self {
        Self { subject: subject.into(), predicate: predicate.into(), object }
    }

    /// Content address: a hash of the triple's canonical string form, used
    /// by the Graph Store for dedup and as a stable key independent of
    /// insertion order.
    #[must_use]
    pub fn content_id(&self) -> String {
        semem_core::fingerprint::content_hash(&self.to_string())
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object {
            Object::Iri(iri) => write!(f, "<{}> <{}> <{iri}> .", self.subject, self.predicate),
            Object::Literal { value, datatype, language } => {
                let escaped = escape_literal(value);
                write!(f, "<{}> <{}> \"{escaped}\"", self.subject, self.predicate)?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")?;
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")?;
                }
                write!(f, " .")
            }
        }
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn property_predicate(key: &str) -> String {
    format!("{RAGNO_NS}{key}")
}

fn property_value_to_object(value: &PropertyValue) -> Object {
    match value {
        PropertyValue::Uri(u) => Object::Iri(u.clone()),
        other => match other.xsd_datatype() {
            Some(dt) => Object::typed_literal(other.literal_lexical(), dt),
            None => Object::plain_literal(other.literal_lexical()),
        },
    }
}

/// Reduce any Element to its triple form: `rdf:type`, the base fields, the
/// typed `properties` map, and a JSON-encoded `extra` literal carrying the
/// concrete type's own fields (`spec.md` §4.B: every Element "derives from
/// a common base"; concrete fields are serialized alongside it rather than
/// requiring a bespoke predicate per concrete type).
#[must_use]
pub fn element_to_triples<E: Element>(element: &E) -> Vec<Triple> {
    let base = element.base();
    let subject = base.uri.clone();
    let mut triples = vec![
        Triple::new(&subject, RDF_TYPE, Object::Iri(format!("{RAGNO_NS}{}", element.element_type().as_str()))),
        Triple::new(&subject, property_predicate("creationTime"), Object::typed_literal(base.creation_time.to_rfc3339(), "http://www.w3.org/2001/XMLSchema#dateTime")),
        Triple::new(&subject, property_predicate("owningGraph"), Object::plain_literal(&base.owning_graph)),
    ];
    if let Some(event_time) = base.event_time {
        triples.push(Triple::new(&subject, property_predicate("eventTime"), Object::typed_literal(event_time.to_rfc3339(), "http://www.w3.org/2001/XMLSchema#dateTime")));
    }
    for (key, value) in &base.properties {
        triples.push(Triple::new(&subject, property_predicate(key), property_value_to_object(value)));
    }
    let extra = element.extra();
    if !extra.is_null() {
        triples.push(Triple::new(
            &subject,
            property_predicate("extra"),
            Object::typed_literal(extra.to_string(), "http://www.w3.org/2001/XMLSchema#string"),
        ));
    }
    triples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;

    #[test]
    fn element_to_triples_includes_type_and_extra() {
        let entity = Entity::new("urn:test", "g1", "Hinton", "corpus-1");
        let triples = element_to_triples(&entity);
        assert!(triples.iter().any(|t| t.predicate == RDF_TYPE));
        assert!(triples.iter().any(|t| t.predicate.ends_with("extra")));
    }

    #[test]
    fn display_round_trips_through_content_id() {
        let t = Triple::new("urn:s", "urn:p", Object::plain_literal("hello"));
        let t2 = Triple::new("urn:s", "urn:p", Object::plain_literal("hello"));
        assert_eq!(t.content_id(), t2.content_id());
    }
}
