//! Errors for provider adaptation and embedding caching.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport/upstream failure, after retries are exhausted (`spec.md`
    /// §7: "Retry with exponential backoff up to a bounded attempt count;
    /// then surface").
    #[error("provider unavailable after {attempts} attempt(s): {message}")]
    Unavailable { attempts: u32, message: String },

    #[error("no provider configured for capability {0}")]
    NoProvider(&'static str),

    #[error(transparent)]
    Core(#[from] semem_core::error::CoreError),
}
