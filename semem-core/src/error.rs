//! Error taxonomy shared at the edges of every `semem-*` crate.
//!
//! Downstream crates define their own richer error enum (see
//! `semem-memory::error::MemoryError`, `semem-store::error::StoreError`, …)
//! with `#[from] CoreError` so a failure originating here (a cancelled
//! request, a malformed provider response) is never re-wrapped in an opaque
//! `Internal` variant further up the stack.

use thiserror::Error;

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error kinds common to provider calls, cancellation, and fingerprinting —
/// the concerns this crate owns. Mirrors the taxonomy in `spec.md` §7.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A capability was requested that the selected provider doesn't offer.
    #[error("provider {provider} does not support capability {capability}")]
    UnsupportedCapability {
        provider: String,
        capability: &'static str,
    },

    /// Transport or upstream-service failure reaching an LLM/embedding
    /// provider. Callers retry this with exponential backoff per §4.A/§7.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The operation was cancelled, or its deadline elapsed.
    #[error("operation cancelled")]
    Cancelled,

    /// Malformed input reaching a public operation.
    #[error("validation failed: {field}: {constraint}")]
    Validation { field: String, constraint: String },

    /// Anything else internal to this crate.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    #[must_use]
    pub fn validation(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}
