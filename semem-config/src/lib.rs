//! Layered configuration for every tunable `spec.md` §6 names as an
//! "environment input" (semantics only, not exact names there — this is
//! where we commit to concrete names and defaults).
//!
//! Grounded on `llmspell-config` (`lib.rs`'s config-file discovery +
//! `config` crate layering, `env.rs`'s env-var registry, `validation.rs`'s
//! structured validation errors). One file discovery order, one `SEMEM_*`
//! environment prefix, one `ValidationError` shape reused by
//! `semem-config` itself and by `semem-zpt`'s parameter validator.

pub mod error;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::ConfigError;
pub use validation::ValidationError;

const CONFIG_SEARCH_PATHS: &[&str] = &["semem.toml", ".semem.toml", "config/semem.toml"];
const ENV_PREFIX: &str = "SEMEM";

/// Decay and reinforcement tuning for the Memory Store (`spec.md` §4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// λ in `e^(-λ·Δt)`.
    pub lambda: f64,
    /// Multiplicative reinforcement applied to `decayFactor` on access.
    pub reinforcement_multiplier: f64,
    /// Upper bound on `decayFactor` after repeated reinforcement.
    pub decay_factor_cap: f64,
    /// Lower bound `decayFactor` is clamped to (never exactly zero).
    pub decay_factor_floor: f64,
    /// `accessCount` threshold for short→long tier promotion.
    pub promotion_threshold: u32,
    /// Interval between tiering-maintenance ticks, in seconds.
    pub maintenance_interval_secs: u64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            lambda: 1e-4,
            reinforcement_multiplier: 1.1,
            decay_factor_cap: 10.0,
            decay_factor_floor: 1e-300,
            promotion_threshold: 10,
            maintenance_interval_secs: 300,
        }
    }
}

/// Spreading-activation tuning (`spec.md` §4.F step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadingActivationConfig {
    pub depth: usize,
    pub hop_decay: f64,
    /// α in `score = sim · decayFactor · (1 + log(1+accessCount)) + α · conceptScore`.
    pub concept_weight: f64,
}

impl Default for SpreadingActivationConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            hop_decay: 0.5,
            concept_weight: 0.3,
        }
    }
}

/// HNSW tuning (`spec.md` §4.D).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
    pub max_elements: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 50,
            max_elements: 1_000_000,
        }
    }
}

/// Graph algorithm tuning (`spec.md` §4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphAlgoConfig {
    /// Teleport probability α for Personalized PageRank.
    pub ppr_alpha: f64,
    /// Default iteration count for the "shallow" PPR used in retrieval.
    pub ppr_shallow_iterations: usize,
    /// Iteration cap for PPR, k-core, and Leiden before `converged=false`.
    pub iteration_cap: usize,
    /// Leiden modularity resolution.
    pub leiden_resolution: f64,
    /// Minimum Leiden community size.
    pub leiden_min_community_size: usize,
}

impl Default for GraphAlgoConfig {
    fn default() -> Self {
        Self {
            ppr_alpha: 0.15,
            ppr_shallow_iterations: 2,
            iteration_cap: 100,
            leiden_resolution: 1.0,
            leiden_min_community_size: 2,
        }
    }
}

/// Dual Retriever weight tuning (`spec.md` §4.H step 5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DualRetrievalConfig {
    pub weight_exact: f64,
    pub weight_similarity: f64,
    pub weight_ppr: f64,
    pub combined_limit: usize,
}

impl Default for DualRetrievalConfig {
    fn default() -> Self {
        Self {
            weight_exact: 0.4,
            weight_similarity: 0.4,
            weight_ppr: 0.2,
            combined_limit: 50,
        }
    }
}

/// Graph Store cache and batching tuning (`spec.md` §4.C).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub batch_size: usize,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            cache_ttl_secs: 60,
            cache_capacity: 10_000,
        }
    }
}

/// Embedding cache tuning (`spec.md` §4.A).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingCacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
    pub max_retry_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for EmbeddingCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 50_000,
            ttl_secs: 3600,
            max_retry_attempts: 4,
            backoff_base_ms: 200,
        }
    }
}

/// ZPT navigation defaults (`spec.md` §4.I/§4.J).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZptConfig {
    pub default_max_tokens: usize,
    pub selection_cache_ttl_secs: u64,
    pub default_tokenizer: String,
    pub default_format: String,
    pub default_chunk_strategy: String,
    pub stage_timeout_ms: u64,
}

impl Default for ZptConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: 4000,
            selection_cache_ttl_secs: 120,
            default_tokenizer: "cl100k".to_string(),
            default_format: "structured".to_string(),
            default_chunk_strategy: "adaptive".to_string(),
            stage_timeout_ms: 2000,
        }
    }
}

/// Concept Extractor tuning (`spec.md` §4.E).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptConfig {
    /// Maximum character length of a single concept token.
    pub max_token_length: usize,
    /// Maximum number of concept tokens kept per extraction.
    pub max_tokens: usize,
    /// Chat model used for extraction prompts.
    pub model: String,
    pub temperature: f32,
}

impl Default for ConceptConfig {
    fn default() -> Self {
        Self {
            max_token_length: 64,
            max_tokens: 32,
            model: "local-default".to_string(),
            temperature: 0.0,
        }
    }
}

/// Ingestion Pipeline tuning (`spec.md` §4.K).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// k-core threshold above which an Entity is "important" enough for
    /// `augment` to summarize.
    pub augment_kcore_threshold: usize,
    /// Cosine similarity above which `enrich` persists a `similar`
    /// Relationship between two retrievable elements.
    pub similarity_edge_threshold: f32,
    /// Batch size for Graph Store triple emission.
    pub batch_size: usize,
    /// Chat model used for decompose/augment/aggregate prompts.
    pub model: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            augment_kcore_threshold: 2,
            similarity_edge_threshold: 0.85,
            batch_size: 100,
            model: "local-default".to_string(),
        }
    }
}

/// Top-level configuration aggregating every component's tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SememConfig {
    pub embedding_dimension: usize,
    pub default_embedding_model: String,
    pub default_chat_model: String,
    pub log_level: String,
    pub decay: DecayConfig,
    pub spreading_activation: SpreadingActivationConfig,
    pub hnsw: HnswConfig,
    pub graph_algo: GraphAlgoConfig,
    pub dual_retrieval: DualRetrievalConfig,
    pub store: StoreConfig,
    pub embedding_cache: EmbeddingCacheConfig,
    pub zpt: ZptConfig,
    pub concepts: ConceptConfig,
    pub ingest: IngestConfig,
}

impl Default for SememConfig {
    fn default() -> Self {
        Self {
            embedding_dimension: 384,
            default_embedding_model: "local-minilm".to_string(),
            default_chat_model: "local-default".to_string(),
            log_level: "info".to_string(),
            decay: DecayConfig::default(),
            spreading_activation: SpreadingActivationConfig::default(),
            hnsw: HnswConfig::default(),
            graph_algo: GraphAlgoConfig::default(),
            dual_retrieval: DualRetrievalConfig::default(),
            store: StoreConfig::default(),
            embedding_cache: EmbeddingCacheConfig::default(),
            zpt: ZptConfig::default(),
            concepts: ConceptConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl SememConfig {
    /// Testing configuration: small caches, a tiny HNSW, short TTLs — fast
    /// unit tests, no production tuning applied.
    #[must_use]
    pub fn for_testing() -> Self {
        let mut cfg = Self::default();
        cfg.hnsw.max_elements = 1000;
        cfg.store.cache_capacity = 100;
        cfg.embedding_cache.capacity = 100;
        cfg
    }

    /// Load from the first discovered config file (searched in
    /// `CONFIG_SEARCH_PATHS` order, matching `llmspell-config`'s discovery
    /// convention), then apply `SEMEM_*` environment overrides on top.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a discovered file fails to parse, or if
    /// the merged configuration fails [`validation::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder().add_source(
            config::Config::try_from(&Self::default()).map_err(ConfigError::Build)?,
        );
        for path in CONFIG_SEARCH_PATHS {
            if Path::new(path).exists() {
                builder = builder.add_source(config::File::with_name(path));
            }
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
        let raw = builder.build().map_err(ConfigError::Build)?;
        let cfg: Self = raw.try_deserialize().map_err(ConfigError::Build)?;
        validation::validate(&cfg)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validation::validate(&SememConfig::default()).unwrap();
    }

    #[test]
    fn testing_config_is_valid() {
        validation::validate(&SememConfig::for_testing()).unwrap();
    }
}
