//! ZPT Navigation (`spec.md` §2 components I/J, §4.I/§4.J): Zoom/Pan/Tilt
//! parameter validation, a caller-supplied element catalog, tilt-specific
//! selection with a TTL-bounded cache, multi-format projection, and a
//! timeout-bounded transformation pipeline with graceful degradation.

pub mod cache;
pub mod catalog;
pub mod chunking;
pub mod error;
pub mod navigator;
pub mod params;
pub mod projector;
pub mod selection;
pub mod tokenizer;
pub mod transformer;

pub mod prelude {
    pub use crate::cache::SelectionCache;
    pub use crate::catalog::{ZptCatalog, ZptElement};
    pub use crate::error::{Result, ZptError};
    pub use crate::navigator::{NavigationDiagnostics, NavigationOutcome, Navigator};
    pub use crate::params::{
        BoundingBox, GeoFilter, NavigationParams, OutputFormat, Pan, RawNavigationParams, TemporalRange, Tilt, TokenizerKind, TransformOptions,
        ValidationIssue, Zoom,
    };
    pub use crate::projector::Projection;
    pub use crate::selection::{SelectedItem, SelectionResult};
    pub use crate::transformer::{NavigationSummary, TransformResult};
}
