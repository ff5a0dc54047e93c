//! Transformation pipeline chunking stage (`spec.md` §4.J "Chunking —
//! apply the configured strategy so that each chunk respects `maxTokens`").
//! Grounded on
//! `llmspell-rag::chunking::strategies::SlidingWindowChunker`'s
//! boundary-aware sliding window, generalized from one strategy to the
//! five `spec.md` names and their fallback chain (`spec.md` §4.J "Failure
//! semantics": "semantic -> fixed -> truncation").

use crate::params::ChunkStrategyKind;
use crate::tokenizer::TokenCounter;

#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub index: usize,
    pub token_count: usize,
}

/// `spec.md` §4.J: chunk `text` under `strategy`, each chunk respecting
/// `max_tokens`. Falls back down the chain on an unsupported/degenerate
/// input rather than producing an empty result; `degraded_to` records
/// which fallback actually ran, or `None` if the requested strategy ran
/// as-is.
pub fn chunk_text(text: &str, strategy: ChunkStrategyKind, max_tokens: usize, counter: &dyn TokenCounter) -> (Vec<Chunk>, Option<&'static str>) {
    if text.is_empty() {
        return (Vec::new(), None);
    }

    match strategy {
        ChunkStrategyKind::Fixed => (fixed_chunks(text, max_tokens, counter), None),
        ChunkStrategyKind::TokenAware => (token_aware_chunks(text, max_tokens, counter), None),
        ChunkStrategyKind::Hierarchical => (hierarchical_chunks(text, max_tokens, counter), None),
        ChunkStrategyKind::Semantic => {
            let chunks = semantic_chunks(text, max_tokens, counter);
            if chunks.is_empty() {
                (fixed_chunks(text, max_tokens, counter), Some("semantic->fixed"))
            } else {
                (chunks, None)
            }
        }
        ChunkStrategyKind::Adaptive => {
            if text.contains("\n\n") {
                (semantic_chunks(text, max_tokens, counter), None)
            } else {
                (token_aware_chunks(text, max_tokens, counter), None)
            }
        }
    }
}

/// Truncate a single chunk to its proportional share of a token budget,
/// the last-resort fallback when even `fixed` chunking can't fit a single
/// unit within budget (`spec.md` §4.J step 5: "proportionally truncate
/// preserving per-element minimum tokens").
#[must_use]
pub fn truncate_to_tokens(text: &str, max_tokens: usize, counter: &dyn TokenCounter) -> String {
    if counter.count_tokens(text) <= max_tokens {
        return text.to_string();
    }
    let mut end = text.len();
    while end > 0 && counter.count_tokens(&text[..end]) > max_tokens {
        end = floor_char_boundary(text, end.saturating_sub((end / 10).max(1)));
    }
    text[..end].to_string()
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn fixed_chunks(text: &str, max_tokens: usize, counter: &dyn TokenCounter) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while start < text.len() {
        let end = estimate_end(text, start, max_tokens, counter);
        let content = text[start..end].to_string();
        let token_count = counter.count_tokens(&content);
        chunks.push(Chunk { content, index, token_count });
        index += 1;
        start = end;
    }
    chunks
}

/// Like `fixed_chunks` but binary-searches the exact token-count boundary
/// with the real tokenizer rather than a flat character estimate, and
/// carries a small overlap so context doesn't hard-cut mid-thought.
fn token_aware_chunks(text: &str, max_tokens: usize, counter: &dyn TokenCounter) -> Vec<Chunk> {
    let overlap_chars = (max_tokens / 10).max(1) * 4;
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while start < text.len() {
        let end = binary_search_end(text, start, max_tokens, counter);
        let content = text[start..end].to_string();
        let token_count = counter.count_tokens(&content);
        chunks.push(Chunk { content, index, token_count });
        index += 1;
        if end >= text.len() {
            break;
        }
        start = floor_char_boundary(text, end.saturating_sub(overlap_chars)).max(start + 1);
    }
    chunks
}

fn binary_search_end(text: &str, start: usize, max_tokens: usize, counter: &dyn TokenCounter) -> usize {
    let slice = &text[start..];
    if slice.is_empty() {
        return start;
    }
    let mut lo = 1;
    let mut hi = slice.len();
    let mut best = floor_char_boundary(slice, hi);
    while lo <= hi {
        let mid = floor_char_boundary(slice, lo + (hi - lo) / 2).max(1);
        if counter.count_tokens(&slice[..mid]) <= max_tokens {
            best = mid;
            if mid == slice.len() {
                break;
            }
            lo = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            hi = mid - 1;
        }
    }
    start + best.max(1).min(slice.len())
}

fn estimate_end(text: &str, start: usize, max_tokens: usize, counter: &dyn TokenCounter) -> usize {
    let approx_chars = max_tokens.saturating_mul(4).max(1);
    let mut end = floor_char_boundary(text, (start + approx_chars).min(text.len()));
    if end <= start {
        end = floor_char_boundary(text, (start + 1).min(text.len())).max(start + 1).min(text.len());
    }
    while end < text.len() && counter.count_tokens(&text[start..end]) > max_tokens && end > start + 1 {
        end = floor_char_boundary(text, end - 1);
    }
    end
}

fn hierarchical_chunks(text: &str, max_tokens: usize, counter: &dyn TokenCounter) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
        if counter.count_tokens(paragraph) <= max_tokens {
            chunks.push(paragraph.to_string());
            continue;
        }
        for sentence in split_sentences(paragraph) {
            if counter.count_tokens(&sentence) <= max_tokens {
                chunks.push(sentence);
            } else {
                let (sub, _) = chunk_text(&sentence, ChunkStrategyKind::TokenAware, max_tokens, counter);
                chunks.extend(sub.into_iter().map(|c| c.content));
            }
        }
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, content)| {
            let token_count = counter.count_tokens(&content);
            Chunk { content, index, token_count }
        })
        .collect()
}

fn semantic_chunks(text: &str, max_tokens: usize, counter: &dyn TokenCounter) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
        let candidate = if current.is_empty() { paragraph.to_string() } else { format!("{current}\n\n{paragraph}") };
        if counter.count_tokens(&candidate) <= max_tokens {
            current = candidate;
        } else {
            if !current.is_empty() {
                chunks.push(current.clone());
            }
            current = paragraph.to_string();
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, content)| {
            let token_count = counter.count_tokens(&content);
            Chunk { content, index, token_count }
        })
        .collect()
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if matches!(b, b'.' | b'!' | b'?') {
            let end = i + 1;
            if end <= text.len() && text.is_char_boundary(end) {
                let candidate = text[start..end].trim();
                if !candidate.is_empty() {
                    sentences.push(candidate.to_string());
                }
                start = end;
            }
        }
    }
    if start < text.len() {
        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::CharRatioCounter;

    fn counter() -> CharRatioCounter {
        CharRatioCounter { name: "test" }
    }

    #[test]
    fn fixed_chunks_respect_max_tokens() {
        let counter = counter();
        let text = "word ".repeat(200);
        let (chunks, fallback) = chunk_text(&text, ChunkStrategyKind::Fixed, 20, &counter);
        assert!(fallback.is_none());
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.token_count <= 20));
    }

    #[test]
    fn token_aware_chunks_overlap_and_cover_all_text() {
        let counter = counter();
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda";
        let (chunks, _) = chunk_text(text, ChunkStrategyKind::TokenAware, 8, &counter);
        assert!(chunks.len() > 1);
        assert!(chunks.last().unwrap().content.ends_with("lambda"));
    }

    #[test]
    fn semantic_chunks_keep_paragraphs_together_when_possible() {
        let counter = counter();
        let text = "para one.\n\npara two.\n\npara three.";
        let (chunks, fallback) = chunk_text(text, ChunkStrategyKind::Semantic, 1000, &counter);
        assert!(fallback.is_none());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let counter = counter();
        let (chunks, fallback) = chunk_text("", ChunkStrategyKind::Fixed, 10, &counter);
        assert!(chunks.is_empty());
        assert!(fallback.is_none());
    }

    #[test]
    fn truncate_to_tokens_shrinks_oversized_text() {
        let counter = counter();
        let text = "word ".repeat(100);
        let truncated = truncate_to_tokens(&text, 5, &counter);
        assert!(counter.count_tokens(&truncated) <= 5);
    }
}
