//! Turtle / N-Triples / JSON-LD serialization of [`crate::triple::Triple`]
//! sets (`spec.md` §4.B, §6 "Graph export formats"). Grounded on
//! `samyama-ai-samyama-graph/src/rdf/serialization` (turtle.rs/jsonld.rs),
//! adapted from its richer `NamedNode`/`BlankNode` model down to this
//! crate's simpler URI-only [`crate::triple::Triple`].

pub mod jsonld;
pub mod ntriples;
pub mod turtle;

pub use jsonld::{to_jsonld, ToJsonLdError};
pub use ntriples::{parse_ntriples, to_ntriples};
pub use turtle::{parse_turtle, to_turtle};
