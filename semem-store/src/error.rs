//! Errors for the Graph Store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("graph not found: {0}")]
    GraphNotFound(String),

    #[error("batch write failed: {succeeded}/{total} triples committed ({reason})")]
    PartialBatchFailure { succeeded: usize, total: usize, reason: String },

    #[error("remote endpoint error: {0}")]
    Remote(String),

    #[error("snapshot I/O error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Rdf(#[from] semem_rdf::error::RdfError),
}
