//! Typed RDF Element model ("Ragno") for the Semem knowledge graph
//! (`spec.md` §2 component B, §3). Provides the seven Element kinds, their
//! structural validation, and Turtle/N-Triples/JSON-LD serialization.

pub mod element;
pub mod entities;
pub mod error;
pub mod serialize;
pub mod triple;
pub mod validation;

pub mod prelude {
    pub use crate::element::{Element, ElementBase, ElementType, PropertyValue};
    pub use crate::entities::{
        normalize_label, Attribute, CommunityElement, Entity, EntityMention, IndexElement,
        Relationship, SemanticUnit, TextElement, DEFAULT_RELATIONSHIP_WEIGHT,
    };
    pub use crate::error::{RdfError, Result};
    pub use crate::triple::{element_to_triples, Object, Triple};
}
