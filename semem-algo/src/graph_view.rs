//! A dense, integer-indexed view of a graph projection, built once per
//! algorithm run from the URIs and edges the caller supplies (`spec.md`
//! §4.G: "all algorithms operate on a view of the Graph Store restricted
//! to a single graph"; "Relationship-nodes are collapsed to edges between
//! their endpoint Entities").
//!
//! Grounded on `samyama-graph-algorithms::common::GraphView`'s
//! dense-index/`index_to_node` mapping, rebuilt here as a single
//! adjacency-list representation — the teacher pack's own `GraphView`
//! carries two incompatible shapes across files (CSR fields in
//! `common.rs`, adjacency lists in `community.rs`/`topology.rs`); this
//! crate picks one (adjacency lists, since every algorithm below walks
//! neighbor lists rather than slicing a CSR array) and stays internally
//! consistent.

use indexmap::IndexMap;

/// Dense node index into [`GraphView`]'s internal vectors.
pub type NodeIndex = usize;

/// A read-only graph projection keyed by Element URI, with optional edge
/// weights (`spec.md` §4.G PPR: "edge weights taken from Relationship
/// `weight`").
pub struct GraphView {
    uris: Vec<String>,
    index_of: IndexMap<String, NodeIndex>,
    /// Undirected adjacency: `neighbors[i]` holds `(neighbor_index, weight)`.
    neighbors: Vec<Vec<(NodeIndex, f64)>>,
}

impl GraphView {
    /// Build a view from a node URI list and an edge list `(source, target,
    /// weight)`. Edges are treated as undirected, matching §4.G's
    /// "unweighted projection" framing for k-core/betweenness/WCC (weight
    /// defaults to 1.0 there) while still carrying real weights through for
    /// PPR.
    #[must_use]
    pub fn new(node_uris: impl IntoIterator<Item = String>, edges: impl IntoIterator<Item = (String, String, f64)>) -> Self {
        let uris: Vec<String> = node_uris.into_iter().collect();
        let index_of: IndexMap<String, NodeIndex> = uris.iter().cloned().enumerate().map(|(i, u)| (u, i)).collect();
        let mut neighbors = vec![Vec::new(); uris.len()];
        for (source, target, weight) in edges {
            if let (Some(&s), Some(&t)) = (index_of.get(&source), index_of.get(&target)) {
                if s != t {
                    neighbors[s].push((t, weight));
                    neighbors[t].push((s, weight));
                }
            }
        }
        Self { uris, index_of, neighbors }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.uris.len()
    }

    #[must_use]
    pub fn uri(&self, index: NodeIndex) -> &str {
        &self.uris[index]
    }

    #[must_use]
    pub fn index_of(&self, uri: &str) -> Option<NodeIndex> {
        self.index_of.get(uri).copied()
    }

    #[must_use]
    pub fn neighbors(&self, index: NodeIndex) -> &[(NodeIndex, f64)] {
        &self.neighbors[index]
    }

    #[must_use]
    pub fn degree(&self, index: NodeIndex) -> usize {
        self.neighbors[index].len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        0..self.uris.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_undirected() {
        let view = GraphView::new(vec!["a".into(), "b".into()], vec![("a".into(), "b".into(), 1.0)]);
        assert_eq!(view.degree(view.index_of("a").unwrap()), 1);
        assert_eq!(view.degree(view.index_of("b").unwrap()), 1);
    }

    #[test]
    fn self_loops_are_dropped() {
        let view = GraphView::new(vec!["a".into()], vec![("a".into(), "a".into(), 1.0)]);
        assert_eq!(view.degree(0), 0);
    }

    #[test]
    fn edges_referencing_unknown_uris_are_ignored() {
        let view = GraphView::new(vec!["a".into()], vec![("a".into(), "ghost".into(), 1.0)]);
        assert_eq!(view.degree(0), 0);
    }
}
