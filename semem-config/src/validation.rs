//! Structured validation, reused by both configuration loading here and the
//! ZPT parameter processor (`spec.md` §4.I: "Validation produces structured
//! errors (`field`, `value`, `constraint`, `suggestion`)"). One shape, used
//! everywhere a caller-supplied value needs rejecting with a reason a UI
//! can render directly.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::SememConfig;

#[derive(Debug, Clone, Serialize, Error)]
#[error("{field}: {constraint} (got {value})")]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub constraint: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        value: impl fmt::Display,
        constraint: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
            constraint: constraint.into(),
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A batch of validation errors, all reported together rather than
/// fail-fast on the first — callers fixing a config file want the whole
/// list, not one at a time.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

pub fn validate(config: &SememConfig) -> Result<(), ConfigErrorList> {
    let mut errors = Vec::new();

    if config.embedding_dimension == 0 {
        errors.push(
            ValidationError::new("embedding_dimension", config.embedding_dimension, "must be > 0")
                .with_suggestion("set embedding_dimension to match your embedding model, e.g. 384"),
        );
    }
    if !(0.0..=1.0).contains(&config.graph_algo.ppr_alpha) {
        errors.push(ValidationError::new(
            "graph_algo.ppr_alpha",
            config.graph_algo.ppr_alpha,
            "must be within [0, 1]",
        ));
    }
    let weights = &config.dual_retrieval;
    let weight_sum = weights.weight_exact + weights.weight_similarity + weights.weight_ppr;
    if (weight_sum - 1.0).abs() > 1e-6 {
        errors.push(
            ValidationError::new(
                "dual_retrieval.{weight_exact,weight_similarity,weight_ppr}",
                weight_sum,
                "must sum to 1.0",
            )
            .with_suggestion("use the defaults 0.4/0.4/0.2 or rebalance proportionally"),
        );
    }
    if config.decay.lambda <= 0.0 {
        errors.push(ValidationError::new(
            "decay.lambda",
            config.decay.lambda,
            "must be > 0 (decayFactor invariant in spec.md §3)",
        ));
    }
    if config.decay.decay_factor_cap <= 1.0 {
        errors.push(ValidationError::new(
            "decay.decay_factor_cap",
            config.decay.decay_factor_cap,
            "must be > 1.0 so reinforcement has headroom",
        ));
    }
    if config.hnsw.m == 0 {
        errors.push(ValidationError::new(
            "hnsw.m",
            config.hnsw.m,
            "out-degree must be > 0",
        ));
    }
    if config.hnsw.ef_search == 0 {
        errors.push(ValidationError::new(
            "hnsw.ef_search",
            config.hnsw.ef_search,
            "must be > 0",
        ));
    }
    if !(0.0..=1.0).contains(&config.ingest.similarity_edge_threshold) {
        errors.push(ValidationError::new(
            "ingest.similarity_edge_threshold",
            config.ingest.similarity_edge_threshold,
            "must be within [0, 1]",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigErrorList(errors))
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConfigErrorList(pub Vec<ValidationError>);

impl From<ConfigErrorList> for ValidationError {
    fn from(list: ConfigErrorList) -> Self {
        // Surface the first error; callers that want the full batch should
        // match on `ConfigErrorList` directly before converting.
        list.0
            .into_iter()
            .next()
            .unwrap_or_else(|| ValidationError::new("config", "", "unknown validation failure"))
    }
}

impl fmt::Display for ConfigErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ValidationErrors(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimension() {
        let mut cfg = SememConfig::default();
        cfg.embedding_dimension = 0;
        let err = validate(&cfg).unwrap_err();
        assert!(err.0.iter().any(|e| e.field == "embedding_dimension"));
    }

    #[test]
    fn rejects_unbalanced_weights() {
        let mut cfg = SememConfig::default();
        cfg.dual_retrieval.weight_exact = 0.9;
        let err = validate(&cfg).unwrap_err();
        assert!(err.0.iter().any(|e| e.field.contains("weight_exact")));
    }
}
