//! Error taxonomy for concept extraction (`spec.md` §4.E: "On parse
//! failure, returns the empty set — never throws"). A parse failure is
//! therefore not a variant here; only provider-level failures are.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConceptError>;

#[derive(Debug, Error)]
pub enum ConceptError {
    #[error(transparent)]
    Core(#[from] semem_core::error::CoreError),
}
