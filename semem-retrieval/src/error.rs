//! Errors for the Dual Retriever (`spec.md` §4.H).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Vector(#[from] semem_vector::error::VectorError),

    #[error(transparent)]
    Core(#[from] semem_core::error::CoreError),
}
