//! File-backed snapshot Graph Store variant (`spec.md` §4.C: "file-backed
//! snapshot (JSON or N-Quads)"). Wraps [`InMemoryGraphStore`] for the
//! working set and persists to disk on demand via `semem-rdf`'s N-Triples
//! serializer, optionally LZ4-compressed.

use std::path::PathBuf;

use async_trait::async_trait;
use semem_rdf::serialize::{parse_ntriples, to_ntriples};
use semem_rdf::triple::Triple;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{Result, StoreError};
use crate::memory::InMemoryGraphStore;
use crate::pattern::{Binding, TriplePattern};
use crate::stats::GraphStats;
use crate::traits::GraphStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    NTriples,
    NTriplesLz4,
}

pub struct FileGraphStore {
    inner: InMemoryGraphStore,
    directory: PathBuf,
    format: SnapshotFormat,
}

impl FileGraphStore {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self { inner: InMemoryGraphStore::new(), directory: directory.into(), format }
    }

    fn snapshot_path(&self, graph: &str) -> PathBuf {
        let extension = match self.format {
            SnapshotFormat::NTriples => "nt",
            SnapshotFormat::NTriplesLz4 => "nt.lz4",
        };
        self.directory.join(format!("{graph}.{extension}"))
    }

    /// Load a graph's snapshot from disk into the in-memory working set, if
    /// present. No-op if the snapshot file doesn't exist yet.
    ///
    /// # Errors
    /// Returns [`StoreError::Snapshot`] on I/O or parse failure.
    #[instrument(skip(self))]
    pub async fn load(&self, graph: &str) -> Result<()> {
        let path = self.snapshot_path(graph);
        if !path.exists() {
            return Ok(());
        }
        let bytes = fs::read(&path).await.map_err(|e| StoreError::Snapshot(e.to_string()))?;
        let text = decode(self.format, &bytes)?;
        let triples = parse_ntriples(&text)?;
        info!(graph, count = triples.len(), "loaded graph snapshot");
        self.inner.load_snapshot(graph, triples);
        Ok(())
    }

    /// Persist the current in-memory state of `graph` to disk.
    ///
    /// # Errors
    /// Returns [`StoreError::Snapshot`] on I/O failure.
    #[instrument(skip(self))]
    pub async fn flush(&self, graph: &str) -> Result<()> {
        fs::create_dir_all(&self.directory).await.map_err(|e| StoreError::Snapshot(e.to_string()))?;
        let triples = self.inner.snapshot(graph);
        let text = to_ntriples(&triples);
        let bytes = encode(self.format, &text);
        fs::write(self.snapshot_path(graph), bytes).await.map_err(|e| StoreError::Snapshot(e.to_string()))?;
        info!(graph, count = triples.len(), "flushed graph snapshot");
        Ok(())
    }
}

fn encode(format: SnapshotFormat, text: &str) -> Vec<u8> {
    match format {
        SnapshotFormat::NTriples => text.as_bytes().to_vec(),
        SnapshotFormat::NTriplesLz4 => lz4_flex::compress_prepend_size(text.as_bytes()),
    }
}

fn decode(format: SnapshotFormat, bytes: &[u8]) -> Result<String> {
    let raw = match format {
        SnapshotFormat::NTriples => bytes.to_vec(),
        SnapshotFormat::NTriplesLz4 => lz4_flex::decompress_size_prepended(bytes).map_err(|e| StoreError::Snapshot(e.to_string()))?,
    };
    String::from_utf8(raw).map_err(|e| StoreError::Snapshot(e.to_string()))
}

#[async_trait]
impl GraphStore for FileGraphStore {
    async fn insert(&self, graph: &str, triples: Vec<Triple>) -> Result<()> {
        self.inner.insert(graph, triples).await?;
        self.flush(graph).await
    }

    async fn delete(&self, graph: &str, pattern: &TriplePattern) -> Result<usize> {
        let removed = self.inner.delete(graph, pattern).await?;
        if removed > 0 {
            self.flush(graph).await?;
        }
        Ok(removed)
    }

    async fn replace(&self, graph: &str, subject: &str, triples: Vec<Triple>) -> Result<()> {
        self.inner.replace(graph, subject, triples).await?;
        self.flush(graph).await
    }

    async fn query(&self, graph: &str, pattern: &TriplePattern) -> Result<Vec<Binding>> {
        self.inner.query(graph, pattern).await
    }

    async fn clear(&self, graph: &str) -> Result<()> {
        self.inner.clear(graph).await?;
        let path = self.snapshot_path(graph);
        if path.exists() {
            fs::remove_file(path).await.map_err(|e| StoreError::Snapshot(e.to_string()))?;
        }
        Ok(())
    }

    async fn stats(&self, graph: &str) -> Result<GraphStats> {
        self.inner.stats(graph).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semem_rdf::triple::Object;
    use tempfile::tempdir;

    #[tokio::test]
    async fn flush_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileGraphStore::new(dir.path(), SnapshotFormat::NTriples);
        store.insert("g1", vec![Triple::new("s", "p", Object::plain_literal("o"))]).await.unwrap();

        let reloaded = FileGraphStore::new(dir.path(), SnapshotFormat::NTriples);
        reloaded.load("g1").await.unwrap();
        let stats = reloaded.stats("g1").await.unwrap();
        assert_eq!(stats.triple_count, 1);
    }

    #[tokio::test]
    async fn compressed_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileGraphStore::new(dir.path(), SnapshotFormat::NTriplesLz4);
        store.insert("g1", vec![Triple::new("s", "p", Object::plain_literal("o"))]).await.unwrap();

        let reloaded = FileGraphStore::new(dir.path(), SnapshotFormat::NTriplesLz4);
        reloaded.load("g1").await.unwrap();
        assert_eq!(reloaded.stats("g1").await.unwrap().triple_count, 1);
    }

    #[tokio::test]
    async fn loading_missing_snapshot_is_a_noop() {
        let dir = tempdir().unwrap();
        let store = FileGraphStore::new(dir.path(), SnapshotFormat::NTriples);
        store.load("nonexistent").await.unwrap();
        assert_eq!(store.stats("nonexistent").await.unwrap().triple_count, 0);
    }
}
