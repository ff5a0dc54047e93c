//! Shared types, errors, cancellation, and provider capability traits used
//! across the Semem memory substrate.
//!
//! Every other `semem-*` crate depends on this one for its base vocabulary;
//! it deliberately contains no storage, graph, or retrieval logic of its
//! own (see `semem-rdf`, `semem-store`, `semem-memory`, …).

pub mod cancellation;
pub mod error;
pub mod fingerprint;
pub mod providers;

pub mod prelude {
    pub use crate::cancellation::{CancellationToken, Deadline};
    pub use crate::error::{CoreError, Result};
    pub use crate::fingerprint::{canonical_json, fingerprint};
    pub use crate::providers::{
        ChatMessage, ChatProvider, ChatRequest, ChatResponse, EmbeddingProvider, ProviderCapability,
        StreamToken,
    };
}
