//! The Concept Extractor (`spec.md` §4.E). Drives a [`ChatProvider`] with a
//! fixed prompt, then parses its response leniently via
//! [`crate::parse::parse_response`]. Any provider failure is treated the
//! same as a parse failure: an empty result, logged, never propagated to
//! the caller — matching the Memory Store's own failure semantics
//! (`spec.md` §4.F: "a provider failure during embedding yields an empty
//! candidate set (logged), never an exception at the API boundary").

use std::sync::Arc;

use semem_config::ConceptConfig;
use semem_core::providers::{ChatMessage, ChatProvider, ChatRequest};
use tracing::{instrument, warn};

use crate::parse::{parse_response, ExtractionResult};

pub struct ConceptExtractor {
    provider: Arc<dyn ChatProvider>,
    config: ConceptConfig,
}

impl ConceptExtractor {
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>, config: ConceptConfig) -> Self {
        Self { provider, config }
    }

    /// Extract concept tokens (and optional relationship triples) from
    /// `text`. Never returns an error: on any provider or parse failure
    /// this returns an empty [`ExtractionResult`].
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn extract(&self, text: &str) -> ExtractionResult {
        if text.trim().is_empty() {
            return ExtractionResult::default();
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: crate::prompt::system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: crate::prompt::user_prompt(text),
                },
            ],
            temperature: Some(self.config.temperature),
        };

        match self.provider.chat(request).await {
            Ok(response) => parse_response(&response.text, self.config.max_token_length, self.config.max_tokens),
            Err(err) => {
                warn!(error = %err, "concept extraction provider call failed, returning empty set");
                ExtractionResult::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semem_core::providers::ChatResponse;
    use semem_core::error::{CoreError, Result as CoreResult};

    struct FixedProvider(&'static str);

    #[async_trait]
    impl ChatProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn chat(&self, _request: ChatRequest) -> CoreResult<ChatResponse> {
            Ok(ChatResponse { text: self.0.to_string() })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ChatProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn chat(&self, _request: ChatRequest) -> CoreResult<ChatResponse> {
            Err(CoreError::ProviderUnavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn extracts_concepts_from_provider_response() {
        let extractor = ConceptExtractor::new(Arc::new(FixedProvider("1. rust\n2. cargo")), ConceptConfig::default());
        let result = extractor.extract("Rust uses Cargo.").await;
        assert_eq!(result.concepts, vec!["rust", "cargo"]);
    }

    #[tokio::test]
    async fn provider_failure_yields_empty_result() {
        let extractor = ConceptExtractor::new(Arc::new(FailingProvider), ConceptConfig::default());
        let result = extractor.extract("anything").await;
        assert!(result.concepts.is_empty());
    }

    #[tokio::test]
    async fn blank_input_short_circuits_without_calling_provider() {
        let extractor = ConceptExtractor::new(Arc::new(FailingProvider), ConceptConfig::default());
        let result = extractor.extract("   ").await;
        assert!(result.concepts.is_empty());
    }
}
