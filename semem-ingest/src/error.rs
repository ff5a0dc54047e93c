//! Errors for the Ingestion Pipeline (`spec.md` §4.K).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Store(#[from] semem_store::error::StoreError),

    #[error(transparent)]
    Vector(#[from] semem_vector::error::VectorError),

    #[error(transparent)]
    Core(#[from] semem_core::error::CoreError),
}
