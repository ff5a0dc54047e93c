//! Token counting for the Transformation pipeline's token-analysis stage
//! (`spec.md` §4.J "Token analysis — count tokens using the configured
//! tokenizer"). Grounded on
//! `llmspell-rag::chunking::tokenizer::TiktokenCounter`'s model-to-BPE
//! dispatch, generalized to `spec.md`'s four named tokenizers. `claude` and
//! `llama` have no bundled BPE table in this workspace's dependency set, so
//! both fall back to the character-ratio estimate (documented in
//! `DESIGN.md`) rather than vendoring one.

use tiktoken_rs::{cl100k_base, p50k_base, CoreBPE};

use crate::params::TokenizerKind;

pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
    fn name(&self) -> &str;
}

pub struct BpeCounter {
    bpe: CoreBPE,
    name: &'static str,
}

impl TokenCounter for BpeCounter {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// ~4 characters per token, the same heuristic
/// `llmspell-rag::chunking::strategies::SlidingWindowChunker` falls back to
/// when no tokenizer is configured.
pub struct CharRatioCounter {
    name: &'static str,
}

impl TokenCounter for CharRatioCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4).max(usize::from(!text.is_empty()))
    }

    fn name(&self) -> &str {
        self.name
    }
}

#[must_use]
pub fn counter_for(kind: TokenizerKind) -> Box<dyn TokenCounter> {
    match kind {
        TokenizerKind::Cl100k => cl100k_base().map_or_else(
            |_| Box::new(CharRatioCounter { name: "cl100k-fallback" }) as Box<dyn TokenCounter>,
            |bpe| Box::new(BpeCounter { bpe, name: "cl100k" }) as Box<dyn TokenCounter>,
        ),
        TokenizerKind::P50k => p50k_base().map_or_else(
            |_| Box::new(CharRatioCounter { name: "p50k-fallback" }) as Box<dyn TokenCounter>,
            |bpe| Box::new(BpeCounter { bpe, name: "p50k" }) as Box<dyn TokenCounter>,
        ),
        TokenizerKind::Claude => Box::new(CharRatioCounter { name: "claude-char-ratio" }),
        TokenizerKind::Llama => Box::new(CharRatioCounter { name: "llama-char-ratio" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_ratio_counter_is_never_zero_for_nonempty_text() {
        let counter = CharRatioCounter { name: "test" };
        assert!(counter.count_tokens("a") >= 1);
    }

    #[test]
    fn char_ratio_counter_is_zero_for_empty_text() {
        let counter = CharRatioCounter { name: "test" };
        assert_eq!(counter.count_tokens(""), 0);
    }

    #[test]
    fn cl100k_counts_tokens_for_known_text() {
        let counter = counter_for(TokenizerKind::Cl100k);
        assert!(counter.count_tokens("hello world") > 0);
    }
}
