//! Structural validation for RDF Elements (`spec.md` §4.B: "Validation
//! rejects: missing required properties per type, dangling references,
//! empty labels").
//!
//! Dangling-reference checking needs visibility into the rest of the graph,
//! so it takes a resolver closure rather than assuming a concrete
//! Graph Store — callers in `semem-store`/`semem-ingest` pass
//! `|uri| store.contains(uri)`.

use crate::element::Element;
use crate::entities::Entity;
use crate::error::{RdfError, Result};

/// Validate an element's own shape: required properties present, no empty
/// labels. Does not check references — see [`validate_references`].
pub fn validate_element<E: Element>(element: &E) -> Result<()> {
    for key in element.required_properties() {
        if element.base().property(key).is_none() {
            return Err(RdfError::Validation {
                uri: element.uri().to_string(),
                reason: format!("missing required property `{key}`"),
            });
        }
    }
    Ok(())
}

/// `spec.md` §3 Entity invariant: `prefLabel` non-empty.
pub fn validate_entity(entity: &Entity) -> Result<()> {
    if entity.pref_label.trim().is_empty() {
        return Err(RdfError::Validation {
            uri: entity.base.uri.clone(),
            reason: "prefLabel must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Check that every URI an Element references resolves via `exists`.
/// `spec.md` §3: "Relationships/Units/Attributes hold non-owning references
/// (URIs) to Entities"; §8 invariant 2: no dangling edges.
pub fn validate_references<E, F>(element: &E, exists: F) -> Result<()>
where
    E: Element,
    F: Fn(&str) -> bool,
{
    for uri in element.referenced_uris() {
        if !exists(&uri) {
            return Err(RdfError::Validation {
                uri: element.uri().to_string(),
                reason: format!("dangling reference to `{uri}`"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_pref_label() {
        let entity = Entity::new("urn:test", "g1", "", "corpus-1");
        assert!(validate_entity(&entity).is_err());
    }

    #[test]
    fn accepts_nonempty_pref_label() {
        let entity = Entity::new("urn:test", "g1", "Hinton", "corpus-1");
        assert!(validate_entity(&entity).is_ok());
    }

    #[test]
    fn detects_dangling_reference() {
        let rel = crate::entities::Relationship::new("urn:test", "g1", "urn:test/entity/missing", "urn:test/entity/also-missing", "relatedTo");
        let err = validate_references(&rel, |_| false).unwrap_err();
        assert!(matches!(err, RdfError::Validation { .. }));
    }

    #[test]
    fn passes_when_all_references_resolve() {
        let rel = crate::entities::Relationship::new("urn:test", "g1", "e1", "e2", "relatedTo");
        assert!(validate_references(&rel, |_| true).is_ok());
    }
}
