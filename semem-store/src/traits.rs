//! The Graph Store trait (`spec.md` §4.C). Grounded on
//! `llmspell-graph::traits::knowledge_graph::KnowledgeGraph`'s `async_trait`
//! shape, generalized from its bi-temporal Entity/Relationship operations
//! to this crate's triple-level model (`semem-rdf::triple::Triple`), since
//! the Graph Store is specified at the RDF layer rather than the typed
//! Element layer.

use async_trait::async_trait;
use semem_rdf::triple::Triple;

use crate::error::Result;
use crate::pattern::{Binding, TriplePattern};
use crate::stats::GraphStats;

/// Durable storage of triples grouped by named graph (`spec.md` §4.C).
/// Concurrency contract: single-writer per graph, lock-free readers;
/// writes are transactional at batch granularity.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// # Errors
    /// Returns [`crate::error::StoreError::PartialBatchFailure`] if the
    /// remote variant only commits a prefix of `triples` before failing.
    async fn insert(&self, graph: &str, triples: Vec<Triple>) -> Result<()>;

    /// Delete every triple in `graph` matching `pattern`. Returns the
    /// number of triples removed.
    async fn delete(&self, graph: &str, pattern: &TriplePattern) -> Result<usize>;

    /// Atomically replace every triple about `subject` in `graph` with
    /// `triples` (`spec.md` §4.C `replace(graph, subject, triples[])`).
    async fn replace(&self, graph: &str, subject: &str, triples: Vec<Triple>) -> Result<()>;

    async fn query(&self, graph: &str, pattern: &TriplePattern) -> Result<Vec<Binding>>;

    async fn clear(&self, graph: &str) -> Result<()>;

    async fn stats(&self, graph: &str) -> Result<GraphStats>;
}
