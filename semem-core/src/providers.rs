//! Provider capability traits (`spec.md` §4.A, §6, §9 "Dynamic dispatch
//! over providers").
//!
//! A provider is any LLM/embedding backend; the core depends only on the
//! capability set it exposes (`embed`, `chat`, `stream`), never on a
//! concrete provider type. This mirrors
//! `llmspell-core::traits::embedding::EmbeddingProvider`, generalized with
//! a sibling `ChatProvider` trait and a `ProviderCapability` enum used for
//! priority-ordered, capability-filtered selection (`semem-providers`).
//!
//! Concrete providers (Ollama, Claude, Mistral, local HTTP, …) are external
//! collaborators per `spec.md` §1 — this crate specifies only the
//! interface they must satisfy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A capability a provider may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderCapability {
    Embed,
    Chat,
    Stream,
    Tokenize,
}

impl ProviderCapability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Embed => "embed",
            Self::Chat => "chat",
            Self::Stream => "stream",
            Self::Tokenize => "tokenize",
        }
    }
}

/// Generates embeddings for text (`spec.md` §4.A: `embed(text, model?) →
/// vector(d)`). `d` is fixed per model; callers that need a different
/// dimension select a different provider rather than asking this one to
/// reshape its output.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier, used in cache keys and provider-selection logs.
    fn name(&self) -> &str;

    /// Batch-embed `texts`. Implementations should batch at the transport
    /// level where the upstream API supports it; callers must not assume
    /// per-text round trips.
    ///
    /// # Errors
    /// Returns [`CoreError::ProviderUnavailable`] on transport/upstream
    /// failure; callers retry with backoff per `spec.md` §4.A/§7.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Fixed output dimensionality for this provider/model.
    fn dimension(&self) -> usize;

    /// Model identifier, if the provider is multi-model.
    fn model(&self) -> Option<&str> {
        None
    }
}

/// A single chat message in `{role, content}` form, matching the
/// `{model, messages[], temperature?, stream?}` wire contract in `spec.md`
/// §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

/// One token delta of a streamed chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamToken {
    pub delta: String,
    pub done: bool,
}

/// Chat/completion capability. `stream` has a default that falls back to a
/// single-chunk "stream" of the non-streaming response so callers of
/// `chat.stream` never need to special-case providers that only implement
/// `chat`.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Lazily-produced token stream. Consumer disconnect should cancel the
    /// underlying transport stream (`spec.md` §6) — implementations that
    /// wrap a cancellable transport should honor `token.cancelled()`.
    async fn stream(
        &self,
        request: ChatRequest,
        token: crate::cancellation::CancellationToken,
    ) -> Result<Vec<StreamToken>> {
        let response = token.race(self.chat(request)).await??;
        Ok(vec![StreamToken {
            delta: response.text,
            done: true,
        }])
    }

    fn capabilities(&self) -> &[ProviderCapability] {
        &[ProviderCapability::Chat]
    }
}

/// Select the highest-priority entry in `providers` that advertises
/// `required`. Mirrors `llmspell-config::providers::ProviderManagerConfig`'s
/// `get_default_provider`, generalized to filter by capability rather than
/// by name (`spec.md` §4.A: "Selection is by priority with capability
/// filtering").
pub fn select_by_capability<'a, P>(
    providers: &'a [(P, &[ProviderCapability])],
    required: ProviderCapability,
) -> Result<&'a P> {
    providers
        .iter()
        .find(|(_, caps)| caps.contains(&required))
        .map(|(p, _)| p)
        .ok_or(CoreError::UnsupportedCapability {
            provider: "<none configured>".to_string(),
            capability: required.as_str(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_first_provider_with_capability() {
        let providers: Vec<(&str, &[ProviderCapability])> = vec![
            ("chat-only", &[ProviderCapability::Chat]),
            ("embed-and-chat", &[ProviderCapability::Chat, ProviderCapability::Embed]),
        ];
        let chosen = select_by_capability(&providers, ProviderCapability::Embed).unwrap();
        assert_eq!(*chosen, "embed-and-chat");
    }

    #[test]
    fn errors_when_no_provider_has_capability() {
        let providers: Vec<(&str, &[ProviderCapability])> =
            vec![("chat-only", &[ProviderCapability::Chat])];
        let err = select_by_capability(&providers, ProviderCapability::Embed).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedCapability { .. }));
    }
}
