//! Deterministic providers for tests, matching the pattern in
//! `llmspell-core::mocks` ("Mock implementations for future-proofing
//! traits"/testing forward compatibility without a live backend).
//!
//! `spec.md` §1 scopes concrete LLM/embedding providers out as external
//! collaborators; this module exists purely so `semem-memory`,
//! `semem-retrieval`, and `semem-ingest` tests never need a live provider.

use async_trait::async_trait;
use semem_core::error::Result;
use semem_core::providers::{ChatProvider, ChatRequest, ChatResponse, EmbeddingProvider};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic hash-based embedding: `embed(x) = embed(x)` always holds
/// (the law-style property in `spec.md` §8), with enough structure that
/// cosine similarity between related strings isn't uniformly zero.
pub struct DeterministicEmbeddingProvider {
    dimension: usize,
}

impl DeterministicEmbeddingProvider {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut vector = vec![0.0f32; self.dimension];
        for word in &words {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dimension;
            vector[idx] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for DeterministicEmbeddingProvider {
    fn name(&self) -> &str {
        "deterministic-mock"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model(&self) -> Option<&str> {
        Some("deterministic-mock-v1")
    }
}

/// Echoes the last user message back with a fixed prefix — enough for
/// ingestion/consolidation tests to exercise the parsing paths in
/// `semem-concepts` without asserting on specific LLM output.
pub struct EchoChatProvider;

#[async_trait]
impl ChatProvider for EchoChatProvider {
    fn name(&self) -> &str {
        "echo-mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let last = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(ChatResponse {
            text: format!("echo: {last}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embed_is_deterministic() {
        let provider = DeterministicEmbeddingProvider::new(32);
        let a = provider.embed(&["capital of France".into()]).await.unwrap();
        let b = provider.embed(&["capital of France".into()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn related_text_has_nonzero_similarity() {
        let provider = DeterministicEmbeddingProvider::new(64);
        let a = provider.embed(&["France Paris capital".into()]).await.unwrap().remove(0);
        let b = provider.embed(&["capital of France".into()]).await.unwrap().remove(0);
        let dot: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        assert!(dot > 0.0);
    }
}
