//! Ingestion Pipeline (`spec.md` §2 component K, §4.K): the four stages
//! that turn raw text chunks into a populated Ragno graph — `decompose`
//! (unit splitting + entity/relationship extraction), `augment` (k-core
//! entity selection + attribute summarization), `aggregate` (Leiden
//! community detection + summarization), and `enrich` (embed retrievable
//! elements and derive `similar` edges). Each stage is individually
//! idempotent via a shared [`dedup::DedupTracker`]; the pipeline does not
//! mandate running all four in a single call, since a caller may re-run
//! `augment`/`aggregate`/`enrich` independently as the graph grows.

pub mod aggregate;
pub mod augment;
pub mod decompose;
pub mod dedup;
pub mod enrich;
pub mod error;
pub mod prompt;
pub mod types;
pub mod units;

pub mod prelude {
    pub use crate::aggregate::Aggregator;
    pub use crate::augment::Augmenter;
    pub use crate::decompose::Decomposer;
    pub use crate::dedup::DedupTracker;
    pub use crate::enrich::{EnrichableElement, Enricher};
    pub use crate::error::{IngestError, Result};
    pub use crate::types::{AggregateResult, AugmentResult, DecomposeResult, EnrichResult};
}
