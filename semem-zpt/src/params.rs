//! ZPT Parameter Processor (`spec.md` §4.I): validates/normalizes
//! navigation parameters and computes the deterministic cache fingerprint.

use chrono::{DateTime, Utc};
use semem_config::ZptConfig;
use serde::{Deserialize, Serialize};

/// `spec.md` §4.I: "selects the element type and implies default
/// result-count/token budgets".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zoom {
    Entity,
    Unit,
    Text,
    Community,
    Corpus,
}

impl Zoom {
    /// Default per-type result cap for this zoom level, used by the
    /// post-process stage (`spec.md` §4.J step 5: "per-type and total
    /// result caps").
    #[must_use]
    pub fn default_result_count(self) -> usize {
        match self {
            Self::Entity | Self::Unit => 20,
            Self::Text | Self::Community => 10,
            Self::Corpus => 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeoFilter {
    BoundingBox(BoundingBox),
    Radius { lat: f64, lon: f64, radius_km: f64 },
}

/// `spec.md` §4.I: "Pan is a configuration" carrying any subset of the
/// four recognized restriction kinds simultaneously.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pan {
    pub topic: Option<String>,
    pub entity: Option<Vec<String>>,
    pub temporal: Option<TemporalRange>,
    pub geographic: Option<GeoFilter>,
}

impl Pan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.entity.is_none() && self.temporal.is_none() && self.geographic.is_none()
    }
}

/// `spec.md` §4.I: "selects the projection/scoring strategy".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tilt {
    Keywords,
    Embedding,
    Graph,
    Temporal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
    Structured,
    Conversational,
    Analytical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    Cl100k,
    P50k,
    Claude,
    Llama,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkStrategyKind {
    Fixed,
    Semantic,
    Adaptive,
    Hierarchical,
    TokenAware,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformOptions {
    pub max_tokens: usize,
    pub format: OutputFormat,
    pub tokenizer: TokenizerKind,
    pub chunk_strategy: ChunkStrategyKind,
    pub include_metadata: bool,
}

/// One structured validation failure (`spec.md` §4.I: "field, value,
/// constraint, suggestion").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub value: String,
    pub constraint: String,
    pub suggestion: String,
}

/// Raw, caller-supplied navigation request before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNavigationParams {
    pub zoom: Option<String>,
    #[serde(default)]
    pub pan: Pan,
    pub tilt: Option<String>,
    pub max_tokens: Option<usize>,
    pub format: Option<String>,
    pub tokenizer: Option<String>,
    pub chunk_strategy: Option<String>,
    pub include_metadata: Option<bool>,
}

/// Validated and defaulted navigation parameters (`spec.md` §4.I
/// "Normalization applies defaults").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationParams {
    pub zoom: Zoom,
    pub pan: Pan,
    pub tilt: Tilt,
    pub transform: TransformOptions,
}

impl NavigationParams {
    /// Deterministic cache key over the canonical JSON serialization of
    /// this (already-normalized) request (`spec.md` §4.I "parameter
    /// fingerprint").
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        semem_core::fingerprint::fingerprint(&value)
    }
}

/// `spec.md` §4.I/§4.J step 1: validate + normalize, collecting every
/// issue rather than failing on the first.
pub fn validate_and_normalize(raw: &RawNavigationParams, defaults: &ZptConfig) -> Result<NavigationParams, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let zoom = match raw.zoom.as_deref() {
        None | Some("") => Zoom::Entity,
        Some("entity") => Zoom::Entity,
        Some("unit") => Zoom::Unit,
        Some("text") => Zoom::Text,
        Some("community") => Zoom::Community,
        Some("corpus") => Zoom::Corpus,
        Some(other) => {
            issues.push(ValidationIssue {
                field: "zoom".to_string(),
                value: other.to_string(),
                constraint: "must be one of entity, unit, text, community, corpus".to_string(),
                suggestion: "entity".to_string(),
            });
            Zoom::Entity
        }
    };

    let tilt = match raw.tilt.as_deref() {
        None | Some("") => Tilt::Keywords,
        Some("keywords") => Tilt::Keywords,
        Some("embedding") => Tilt::Embedding,
        Some("graph") => Tilt::Graph,
        Some("temporal") => Tilt::Temporal,
        Some(other) => {
            issues.push(ValidationIssue {
                field: "tilt".to_string(),
                value: other.to_string(),
                constraint: "must be one of keywords, embedding, graph, temporal".to_string(),
                suggestion: "keywords".to_string(),
            });
            Tilt::Keywords
        }
    };

    let format = match raw.format.as_deref() {
        None | Some("") => default_format(defaults),
        Some("json") => OutputFormat::Json,
        Some("markdown") => OutputFormat::Markdown,
        Some("structured") => OutputFormat::Structured,
        Some("conversational") => OutputFormat::Conversational,
        Some("analytical") => OutputFormat::Analytical,
        Some(other) => {
            issues.push(ValidationIssue {
                field: "format".to_string(),
                value: other.to_string(),
                constraint: "must be one of json, markdown, structured, conversational, analytical".to_string(),
                suggestion: defaults.default_format.clone(),
            });
            default_format(defaults)
        }
    };

    let tokenizer = match raw.tokenizer.as_deref() {
        None | Some("") => default_tokenizer(defaults),
        Some("cl100k") => TokenizerKind::Cl100k,
        Some("p50k") => TokenizerKind::P50k,
        Some("claude") => TokenizerKind::Claude,
        Some("llama") => TokenizerKind::Llama,
        Some(other) => {
            issues.push(ValidationIssue {
                field: "tokenizer".to_string(),
                value: other.to_string(),
                constraint: "must be one of cl100k, p50k, claude, llama".to_string(),
                suggestion: defaults.default_tokenizer.clone(),
            });
            default_tokenizer(defaults)
        }
    };

    let chunk_strategy = match raw.chunk_strategy.as_deref() {
        None | Some("") => default_chunk_strategy(defaults),
        Some("fixed") => ChunkStrategyKind::Fixed,
        Some("semantic") => ChunkStrategyKind::Semantic,
        Some("adaptive") => ChunkStrategyKind::Adaptive,
        Some("hierarchical") => ChunkStrategyKind::Hierarchical,
        Some("token-aware") => ChunkStrategyKind::TokenAware,
        Some(other) => {
            issues.push(ValidationIssue {
                field: "chunkStrategy".to_string(),
                value: other.to_string(),
                constraint: "must be one of fixed, semantic, adaptive, hierarchical, token-aware".to_string(),
                suggestion: defaults.default_chunk_strategy.clone(),
            });
            default_chunk_strategy(defaults)
        }
    };

    let max_tokens = raw.max_tokens.unwrap_or(defaults.default_max_tokens);
    if max_tokens == 0 {
        issues.push(ValidationIssue {
            field: "maxTokens".to_string(),
            value: "0".to_string(),
            constraint: "must be greater than 0".to_string(),
            suggestion: defaults.default_max_tokens.to_string(),
        });
    }

    if let Some(temporal) = &raw.pan.temporal {
        if let (Some(start), Some(end)) = (temporal.start, temporal.end) {
            if start > end {
                issues.push(ValidationIssue {
                    field: "pan.temporal".to_string(),
                    value: format!("{start}..{end}"),
                    constraint: "start must not be after end".to_string(),
                    suggestion: "swap start and end".to_string(),
                });
            }
        }
    }

    if let Some(GeoFilter::BoundingBox(bbox)) = &raw.pan.geographic {
        if bbox.west > bbox.east || bbox.south > bbox.north {
            issues.push(ValidationIssue {
                field: "pan.geographic".to_string(),
                value: format!("{bbox:?}"),
                constraint: "bbox must satisfy west <= east and south <= north".to_string(),
                suggestion: "swap the offending coordinates".to_string(),
            });
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(NavigationParams {
        zoom,
        pan: raw.pan.clone(),
        tilt,
        transform: TransformOptions { max_tokens, format, tokenizer, chunk_strategy, include_metadata: raw.include_metadata.unwrap_or(true) },
    })
}

fn default_format(defaults: &ZptConfig) -> OutputFormat {
    match defaults.default_format.as_str() {
        "json" => OutputFormat::Json,
        "markdown" => OutputFormat::Markdown,
        "conversational" => OutputFormat::Conversational,
        "analytical" => OutputFormat::Analytical,
        _ => OutputFormat::Structured,
    }
}

fn default_tokenizer(defaults: &ZptConfig) -> TokenizerKind {
    match defaults.default_tokenizer.as_str() {
        "p50k" => TokenizerKind::P50k,
        "claude" => TokenizerKind::Claude,
        "llama" => TokenizerKind::Llama,
        _ => TokenizerKind::Cl100k,
    }
}

fn default_chunk_strategy(defaults: &ZptConfig) -> ChunkStrategyKind {
    match defaults.default_chunk_strategy.as_str() {
        "fixed" => ChunkStrategyKind::Fixed,
        "semantic" => ChunkStrategyKind::Semantic,
        "hierarchical" => ChunkStrategyKind::Hierarchical,
        "token-aware" => ChunkStrategyKind::TokenAware,
        _ => ChunkStrategyKind::Adaptive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_zoom_is_rejected_with_suggestion() {
        let raw = RawNavigationParams { zoom: Some("galaxy".to_string()), ..Default::default() };
        let issues = validate_and_normalize(&raw, &ZptConfig::default()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "zoom");
        assert_eq!(issues[0].suggestion, "entity");
    }

    #[test]
    fn defaults_fill_in_missing_fields() {
        let params = validate_and_normalize(&RawNavigationParams::default(), &ZptConfig::default()).unwrap();
        assert_eq!(params.zoom, Zoom::Entity);
        assert_eq!(params.tilt, Tilt::Keywords);
        assert_eq!(params.transform.max_tokens, ZptConfig::default().default_max_tokens);
    }

    #[test]
    fn fingerprint_is_stable_under_pan_field_order() {
        let defaults = ZptConfig::default();
        let mut raw_a = RawNavigationParams { zoom: Some("entity".to_string()), ..Default::default() };
        raw_a.pan.topic = Some("neural-networks".to_string());
        let params_a = validate_and_normalize(&raw_a, &defaults).unwrap();
        let params_b = validate_and_normalize(&raw_a, &defaults).unwrap();
        assert_eq!(params_a.fingerprint(), params_b.fingerprint());
    }

    #[test]
    fn inverted_temporal_range_is_rejected() {
        let mut raw = RawNavigationParams::default();
        raw.pan.temporal = Some(TemporalRange { start: Some(Utc::now()), end: Some(Utc::now() - chrono::Duration::days(1)) });
        let issues = validate_and_normalize(&raw, &ZptConfig::default()).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "pan.temporal"));
    }
}
