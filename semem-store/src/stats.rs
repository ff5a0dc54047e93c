//! `spec.md` §4.C: `stats(graph) → {nodeCount, edgeCount, …}`.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub triple_count: usize,
}
