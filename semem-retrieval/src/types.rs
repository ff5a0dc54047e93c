//! Result and request shapes for the Dual Retriever (`spec.md` §4.H).

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogType;

/// Which stages `spec.md` §4.H ran to produce a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalMode {
    Exact,
    Similarity,
    Dual,
}

/// Which of the three stages contributed to a given hit, kept for the
/// `provenance` field `spec.md` §4.H step 5 requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub exact: bool,
    pub similarity: bool,
    pub ppr: bool,
}

/// One ranked result (`spec.md` §4.H step 5: "each marked with sub-scores,
/// element type, and provenance").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub uri: String,
    pub element_type: Option<&'static str>,
    pub exact_score: f64,
    pub similarity_score: f64,
    pub ppr_score: f64,
    pub final_score: f64,
    pub provenance: Provenance,
}

impl RetrievalHit {
    pub(crate) fn element_type_str(catalog_type: Option<CatalogType>) -> Option<&'static str> {
        catalog_type.map(CatalogType::as_str)
    }
}
