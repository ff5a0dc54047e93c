//! Dual Retriever (`spec.md` §2 component H, §4.H): exact label match,
//! Vector Index similarity, and personalized PageRank over the
//! Relationship graph, merged into one ranked, provenance-tagged result
//! list.

pub mod catalog;
pub mod error;
pub mod retriever;
pub mod types;

pub mod prelude {
    pub use crate::catalog::{CatalogType, RetrievalCatalog};
    pub use crate::error::{Result, RetrievalError};
    pub use crate::retriever::DualRetriever;
    pub use crate::types::{Provenance, RetrievalHit, RetrievalMode};
}
