//! Graph algorithms over a single-graph projection of the Ragno knowledge
//! graph (`spec.md` §2 component G, §4.G): k-core decomposition,
//! betweenness centrality, connected components, Leiden community
//! detection, and personalized PageRank.

pub mod betweenness;
pub mod components;
pub mod error;
pub mod graph_view;
pub mod kcore;
pub mod leiden;
pub mod pagerank;
pub mod termination;

pub mod prelude {
    pub use crate::betweenness::betweenness_centrality;
    pub use crate::components::{connected_components, Components};
    pub use crate::error::{AlgoError, Result};
    pub use crate::graph_view::{GraphView, NodeIndex};
    pub use crate::kcore::k_core_decomposition;
    pub use crate::leiden::{leiden_communities, LeidenConfig, LeidenResult};
    pub use crate::pagerank::{personalized_pagerank, top_k_per_type, PprConfig};
    pub use crate::termination::Converging;
}
