//! Configuration error types.

use thiserror::Error;

use crate::validation::ConfigErrorList;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigErrorList),
}
