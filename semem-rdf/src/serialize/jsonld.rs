//! JSON-LD emission, grouping a flat [`Triple`] list by subject into
//! `@id`-keyed objects (`spec.md` §6 "Graph export formats" names JSON-LD
//! alongside Turtle/N-Triples). This crate only ever needs to emit JSON-LD
//! (export), never parse it back in.

use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::triple::{Object, Triple};

#[derive(Debug, Error)]
pub enum ToJsonLdError {
    #[error("triple set is empty")]
    Empty,
}

/// Render triples as a JSON-LD `@graph` document. Literal objects with an
/// XSD datatype become `{"@value": ..., "@type": ...}`; language-tagged
/// literals become `{"@value": ..., "@language": ...}`; IRI objects become
/// `{"@id": ...}`.
///
/// # Errors
/// Returns [`ToJsonLdError::Empty`] if `triples` is empty.
pub fn to_jsonld(triples: &[Triple]) -> Result<JsonValue, ToJsonLdError> {
    if triples.is_empty() {
        return Err(ToJsonLdError::Empty);
    }

    let mut by_subject: IndexMap<&str, IndexMap<&str, Vec<JsonValue>>> = IndexMap::new();
    for triple in triples {
        by_subject
            .entry(triple.subject.as_str())
            .or_default()
            .entry(triple.predicate.as_str())
            .or_default()
            .push(object_to_jsonld(&triple.object));
    }

    let graph: Vec<JsonValue> = by_subject
        .into_iter()
        .map(|(subject, predicates)| {
            let mut node = serde_json::Map::new();
            node.insert("@id".to_string(), json!(subject));
            for (predicate, values) in predicates {
                let value = if values.len() == 1 { values.into_iter().next().unwrap() } else { JsonValue::Array(values) };
                node.insert(predicate.to_string(), value);
            }
            JsonValue::Object(node)
        })
        .collect();

    Ok(json!({ "@graph": graph }))
}

fn object_to_jsonld(object: &Object) -> JsonValue {
    match object {
        Object::Iri(iri) => json!({ "@id": iri }),
        Object::Literal { value, datatype: Some(dt), .. } => json!({ "@value": value, "@type": dt }),
        Object::Literal { value, language: Some(lang), .. } => json!({ "@value": value, "@language": lang }),
        Object::Literal { value, .. } => json!({ "@value": value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_triples_by_subject() {
        let triples = vec![
            Triple::new("urn:s", "urn:p1", Object::plain_literal("a")),
            Triple::new("urn:s", "urn:p2", Object::Iri("urn:o".to_string())),
        ];
        let doc = to_jsonld(&triples).unwrap();
        let graph = doc["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph[0]["@id"], "urn:s");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(to_jsonld(&[]), Err(ToJsonLdError::Empty)));
    }

    #[test]
    fn repeated_predicate_becomes_array() {
        let triples = vec![
            Triple::new("urn:s", "urn:p", Object::plain_literal("a")),
            Triple::new("urn:s", "urn:p", Object::plain_literal("b")),
        ];
        let doc = to_jsonld(&triples).unwrap();
        assert!(doc["@graph"][0]["urn:p"].is_array());
    }
}
