//! Discovery and adjacency grouping of bundlable resource references.

pub mod extract;
pub mod grouping;

pub use extract::{ResourceReference, extract_references, is_external_url};
pub use grouping::group_adjacent;
