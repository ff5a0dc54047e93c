//! Errors for ZPT navigation (`spec.md` §4.I/§4.J).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ZptError>;

#[derive(Debug, Error)]
pub enum ZptError {
    /// Parameter validation failed (`spec.md` §4.I: "structured errors
    /// (field, value, constraint, suggestion)"). Carries every issue found,
    /// not just the first.
    #[error("{} invalid navigation parameter(s)", .0.len())]
    InvalidParameters(Vec<crate::params::ValidationIssue>),

    #[error(transparent)]
    Vector(#[from] semem_vector::error::VectorError),

    #[error(transparent)]
    Core(#[from] semem_core::error::CoreError),
}
