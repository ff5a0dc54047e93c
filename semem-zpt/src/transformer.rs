//! Transformation pipeline (`spec.md` §4.J "Transformation ... pipeline
//! stages, each with its own timeout"): token analysis, chunking,
//! formatting, metadata encoding, output validation. A timeout in
//! chunking or formatting falls back down the chain
//! `semantic -> fixed -> truncation` and marks the result `degraded`.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::timeout;

use crate::chunking::{chunk_text, truncate_to_tokens, Chunk};
use crate::params::{ChunkStrategyKind, OutputFormat, Pan, Tilt, TransformOptions, Zoom};
use crate::tokenizer::{counter_for, TokenCounter};

/// Per-request echo of the navigation parameters, embedded by the
/// metadata-encoding stage (`spec.md` §4.J "embed navigation context
/// (zoom, pan, tilt, counts) inline, as header, or compactly").
#[derive(Debug, Clone)]
pub struct NavigationSummary {
    pub zoom: Zoom,
    pub pan: Pan,
    pub tilt: Tilt,
    pub counts_by_type: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub content: String,
    pub token_count: usize,
    pub degraded: bool,
    pub fallbacks: Vec<String>,
}

const TRUNCATE_MIN_TOKENS: usize = 20;

/// `spec.md` §4.J: run the five transformation stages over already
/// projected `content`, each stage bounded by `stage_timeout`.
pub async fn transform(content: &str, options: &TransformOptions, nav: &NavigationSummary, stage_timeout: Duration) -> TransformResult {
    let counter = counter_for(options.tokenizer);
    let mut fallbacks = Vec::new();

    // Stage 1: token analysis.
    let total_before = match timeout(stage_timeout, count_tokens_async(content, counter.as_ref())).await {
        Ok(count) => count,
        Err(_) => {
            fallbacks.push("token-analysis-timeout".to_string());
            content.chars().count().div_ceil(4)
        }
    };

    // Stage 2: chunking, with the strategy's own semantic->fixed fallback
    // plus a timeout fallback straight to a single truncated chunk.
    let chunks = match timeout(stage_timeout, chunk_async(content, options.chunk_strategy, options.max_tokens, counter.as_ref())).await {
        Ok((chunks, applied_fallback)) => {
            if let Some(fallback) = applied_fallback {
                fallbacks.push(fallback.to_string());
            }
            chunks
        }
        Err(_) => {
            fallbacks.push("chunking-timeout->truncation".to_string());
            let truncated = truncate_to_tokens(content, options.max_tokens, counter.as_ref());
            let token_count = counter.count_tokens(&truncated);
            vec![Chunk { content: truncated, index: 0, token_count }]
        }
    };

    // Stage 3: formatting, decorating each chunk per the configured format.
    let formatted = match timeout(stage_timeout, format_chunks_async(&chunks, options.format)).await {
        Ok(rendered) => rendered,
        Err(_) => {
            fallbacks.push("formatting-timeout->plain".to_string());
            chunks.iter().map(|c| c.content.clone()).collect::<Vec<_>>()
        }
    };

    // Stage 4: metadata encoding, governed by `includeMetadata` and a
    // per-format policy (inline / header / compact). Zero selected items
    // still produce a valid (empty) result rather than a bare metadata
    // block (`spec.md` §4.J "zero items still produce a valid result").
    let with_metadata = if formatted.is_empty() {
        String::new()
    } else if options.include_metadata {
        encode_metadata(&formatted, options.format, nav)
    } else {
        formatted.join("\n\n")
    };

    // Stage 5: output validation, proportionally truncating if the
    // assembled content exceeds the token budget. Truncation reserves
    // room for the navigation-context block and reformats + re-encodes
    // it afterward, rather than rebuilding from raw chunk content and
    // silently dropping both the per-format decoration and the
    // `navigationContext` metadata stage 4 produced.
    let final_tokens = counter.count_tokens(&with_metadata);
    let (content, token_count, degraded_by_validation) = if final_tokens > options.max_tokens && total_before > 0 {
        let has_metadata = options.include_metadata && !formatted.is_empty();
        let metadata_overhead = if has_metadata {
            final_tokens.saturating_sub(counter.count_tokens(&formatted.join("\n\n")))
        } else {
            0
        };
        let effective_budget = options.max_tokens.saturating_sub(metadata_overhead).max(TRUNCATE_MIN_TOKENS);
        let scale = effective_budget as f64 / final_tokens as f64;
        let rebalanced_chunks: Vec<Chunk> = chunks
            .iter()
            .map(|c| {
                let budget = ((c.token_count as f64 * scale) as usize).max(TRUNCATE_MIN_TOKENS.min(c.token_count));
                let truncated = truncate_to_tokens(&c.content, budget, counter.as_ref());
                let token_count = counter.count_tokens(&truncated);
                Chunk { content: truncated, index: c.index, token_count }
            })
            .collect();
        let reformatted = format_chunks_async(&rebalanced_chunks, options.format).await;
        let rebuilt = if has_metadata {
            encode_metadata(&reformatted, options.format, nav)
        } else {
            reformatted.join("\n\n")
        };
        let tokens = counter.count_tokens(&rebuilt);
        (rebuilt, tokens, true)
    } else {
        (with_metadata, final_tokens, false)
    };

    if degraded_by_validation {
        fallbacks.push("output-truncated".to_string());
    }

    TransformResult { content, token_count, degraded: !fallbacks.is_empty(), fallbacks }
}

async fn count_tokens_async(content: &str, counter: &dyn TokenCounter) -> usize {
    counter.count_tokens(content)
}

async fn chunk_async(content: &str, strategy: ChunkStrategyKind, max_tokens: usize, counter: &dyn TokenCounter) -> (Vec<Chunk>, Option<&'static str>) {
    chunk_text(content, strategy, max_tokens, counter)
}

async fn format_chunks_async(chunks: &[Chunk], format: OutputFormat) -> Vec<String> {
    chunks
        .iter()
        .map(|chunk| match format {
            OutputFormat::Markdown => format!("### Chunk {}\n\n{}", chunk.index, chunk.content),
            OutputFormat::Structured => format!("[{}] {}", chunk.index, chunk.content),
            OutputFormat::Json | OutputFormat::Conversational | OutputFormat::Analytical => chunk.content.clone(),
        })
        .collect()
}

fn encode_metadata(formatted_chunks: &[String], format: OutputFormat, nav: &NavigationSummary) -> String {
    let summary = format!(
        "zoom={:?} tilt={:?} topic={} counts={:?}",
        nav.zoom,
        nav.tilt,
        nav.pan.topic.clone().unwrap_or_else(|| "-".to_string()),
        nav.counts_by_type
    );
    match format {
        OutputFormat::Json | OutputFormat::Structured => format!("# navigation: {summary}\n\n{}", formatted_chunks.join("\n\n")),
        OutputFormat::Markdown | OutputFormat::Conversational => {
            format!("{}\n\n> {summary}", formatted_chunks.join("\n\n"))
        }
        OutputFormat::Analytical => format!("{}\n{summary}", formatted_chunks.join("\n\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TokenizerKind;

    fn options(strategy: ChunkStrategyKind, max_tokens: usize, format: OutputFormat) -> TransformOptions {
        TransformOptions { max_tokens, format, tokenizer: TokenizerKind::Cl100k, chunk_strategy: strategy, include_metadata: true }
    }

    fn nav() -> NavigationSummary {
        NavigationSummary { zoom: Zoom::Unit, pan: Pan::default(), tilt: Tilt::Keywords, counts_by_type: HashMap::new() }
    }

    #[tokio::test]
    async fn transform_respects_token_budget() {
        let content = "word ".repeat(500);
        let result = transform(&content, &options(ChunkStrategyKind::Fixed, 50, OutputFormat::Structured), &nav(), Duration::from_secs(5)).await;
        assert!(result.token_count <= 50 + TRUNCATE_MIN_TOKENS);
    }

    #[tokio::test]
    async fn metadata_is_embedded_when_requested() {
        let result = transform("hello world", &options(ChunkStrategyKind::Fixed, 1000, OutputFormat::Markdown), &nav(), Duration::from_secs(5)).await;
        assert!(result.content.contains("zoom="));
    }

    #[tokio::test]
    async fn empty_content_yields_non_degraded_empty_result() {
        let result = transform("", &options(ChunkStrategyKind::Fixed, 1000, OutputFormat::Json), &nav(), Duration::from_secs(5)).await;
        assert_eq!(result.token_count, 0);
    }
}
