//! Errors for the RDF Element Model.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RdfError>;

#[derive(Debug, Error)]
pub enum RdfError {
    #[error("invalid IRI: {0}")]
    InvalidIri(String),

    #[error("validation failed for {uri}: {reason}")]
    Validation { uri: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}
