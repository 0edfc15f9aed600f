//! URL handling: normalization and crawl-boundary filters
//!
//! These are pure functions used by the navigation extractors and the crawl
//! orchestrator to decide which links belong to the document being built.

mod filters;
mod normalize;

pub use filters::{is_different_doc_section, is_different_version_path, should_skip};
pub use normalize::normalize;
