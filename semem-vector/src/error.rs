//! Errors for the Vector Index.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorError>;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector id not found: {0}")]
    NotFound(String),

    #[error("index capacity exceeded ({0} elements)")]
    CapacityExceeded(usize),

    #[error("snapshot I/O error: {0}")]
    Snapshot(String),
}
