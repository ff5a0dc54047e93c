//! Error taxonomy for the Memory Store (`spec.md` §4.F).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("interaction not found: {0}")]
    NotFound(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Vector(#[from] semem_vector::error::VectorError),

    #[error(transparent)]
    Core(#[from] semem_core::error::CoreError),
}
