//! Memory Store (`spec.md` §2 component F, §4.F): Interactions, the
//! Concept Graph, decay/reinforcement, tiering, and spreading-activation
//! retrieval over the Vector Index.

pub mod concept_graph;
pub mod decay;
pub mod error;
pub mod store;
pub mod types;

pub mod prelude {
    pub use crate::concept_graph::ConceptGraph;
    pub use crate::error::{MemoryError, Result};
    pub use crate::store::MemoryStore;
    pub use crate::types::{Interaction, InteractionAdded, ScoredInteraction, Tier};
}
