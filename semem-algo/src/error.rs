//! Errors for the Graph Algorithms crate. Most algorithms here are total
//! functions over a [`crate::graph_view::GraphView`] and cannot fail; this
//! exists for the few entry points that validate caller input first.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AlgoError>;

#[derive(Debug, Error)]
pub enum AlgoError {
    #[error("empty seed set and empty graph: no teleport distribution possible")]
    EmptyGraph,

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
