//! Concept Extractor (`spec.md` §2 component E, §4.E): LLM-driven
//! extraction of concept tokens and optional relationship triples from
//! free text, with lenient output parsing and graceful degradation to an
//! empty result on any failure.

pub mod error;
pub mod extractor;
pub mod parse;
pub mod prompt;

pub mod prelude {
    pub use crate::error::{ConceptError, Result};
    pub use crate::extractor::ConceptExtractor;
    pub use crate::parse::{parse_response, ConceptTriple, ExtractionResult};
}
