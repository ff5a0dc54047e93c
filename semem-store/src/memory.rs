//! In-memory Graph Store variant (`spec.md` §4.C: "in-memory (for tests
//! and small corpora)"). Single-writer-per-graph via a `parking_lot::RwLock`
//! per graph entry in a `DashMap`, matching the concurrency contract in
//! `spec.md` §4.C and §5.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use semem_rdf::triple::Triple;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::pattern::{bind, Binding, TriplePattern};
use crate::stats::GraphStats;
use crate::traits::GraphStore;

#[derive(Default)]
pub struct InMemoryGraphStore {
    graphs: DashMap<String, RwLock<Vec<Triple>>>,
}

impl InMemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all triples currently stored in `graph`, for callers that
    /// need a plain `Vec` (e.g. the file-backed variant's serializer, or
    /// `semem-algo`'s graph view construction).
    #[must_use]
    pub fn snapshot(&self, graph: &str) -> Vec<Triple> {
        self.graphs.get(graph).map(|g| g.read().clone()).unwrap_or_default()
    }

    pub fn load_snapshot(&self, graph: &str, triples: Vec<Triple>) {
        self.graphs.insert(graph.to_string(), RwLock::new(triples));
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    #[instrument(skip(self, triples), fields(graph, count = triples.len()))]
    async fn insert(&self, graph: &str, triples: Vec<Triple>) -> Result<()> {
        let entry = self.graphs.entry(graph.to_string()).or_insert_with(|| RwLock::new(Vec::new()));
        let mut store = entry.write();
        let existing: HashSet<String> = store.iter().map(Triple::content_id).collect();
        for triple in triples {
            if !existing.contains(&triple.content_id()) {
                store.push(triple);
            }
        }
        debug!(graph, "insert committed");
        Ok(())
    }

    async fn delete(&self, graph: &str, pattern: &TriplePattern) -> Result<usize> {
        let Some(entry) = self.graphs.get(graph) else { return Ok(0) };
        let mut store = entry.write();
        let before = store.len();
        store.retain(|t| !pattern.matches(t));
        Ok(before - store.len())
    }

    async fn replace(&self, graph: &str, subject: &str, triples: Vec<Triple>) -> Result<()> {
        let entry = self.graphs.entry(graph.to_string()).or_insert_with(|| RwLock::new(Vec::new()));
        let mut store = entry.write();
        store.retain(|t| t.subject != subject);
        store.extend(triples);
        Ok(())
    }

    async fn query(&self, graph: &str, pattern: &TriplePattern) -> Result<Vec<Binding>> {
        let Some(entry) = self.graphs.get(graph) else { return Ok(Vec::new()) };
        let store = entry.read();
        Ok(store.iter().filter(|t| pattern.matches(t)).map(|t| bind(pattern, t)).collect())
    }

    async fn clear(&self, graph: &str) -> Result<()> {
        self.graphs.remove(graph);
        Ok(())
    }

    async fn stats(&self, graph: &str) -> Result<GraphStats> {
        let Some(entry) = self.graphs.get(graph) else { return Ok(GraphStats::default()) };
        let store = entry.read();
        let mut nodes = HashSet::new();
        for t in store.iter() {
            nodes.insert(t.subject.clone());
            if let semem_rdf::triple::Object::Iri(iri) = &t.object {
                nodes.insert(iri.clone());
            }
        }
        Ok(GraphStats { node_count: nodes.len(), edge_count: store.len(), triple_count: store.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semem_rdf::triple::Object;

    #[tokio::test]
    async fn insert_deduplicates_by_content_id() {
        let store = InMemoryGraphStore::new();
        let t = Triple::new("s", "p", Object::plain_literal("o"));
        store.insert("g1", vec![t.clone(), t.clone()]).await.unwrap();
        let stats = store.stats("g1").await.unwrap();
        assert_eq!(stats.triple_count, 1);
    }

    #[tokio::test]
    async fn delete_removes_matching_triples() {
        let store = InMemoryGraphStore::new();
        store.insert("g1", vec![Triple::new("s", "p", Object::plain_literal("o"))]).await.unwrap();
        let removed = store.delete("g1", &crate::pattern::TriplePattern::any().with_subject("s")).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.stats("g1").await.unwrap().triple_count, 0);
    }

    #[tokio::test]
    async fn replace_swaps_all_triples_for_a_subject() {
        let store = InMemoryGraphStore::new();
        store.insert("g1", vec![Triple::new("s", "p1", Object::plain_literal("old"))]).await.unwrap();
        store.replace("g1", "s", vec![Triple::new("s", "p2", Object::plain_literal("new"))]).await.unwrap();
        let bindings = store.query("g1", &crate::pattern::TriplePattern::any().with_subject("s")).await.unwrap();
        assert_eq!(bindings.len(), 1);
    }

    #[tokio::test]
    async fn query_on_missing_graph_returns_empty() {
        let store = InMemoryGraphStore::new();
        let bindings = store.query("missing", &crate::pattern::TriplePattern::any()).await.unwrap();
        assert!(bindings.is_empty());
    }
}
