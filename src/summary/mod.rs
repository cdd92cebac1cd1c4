//! Summary output model

pub mod document;
pub mod field;
pub mod transform;

pub use document::DocumentSummary;
pub use field::{MergeConflict, SummaryField};
pub use transform::{Capabilities, SummaryTransform};

/// Summary every schema ends up with
pub const DEFAULT_SUMMARY: &str = "default";

/// Summary holding prefetched attribute values
pub const ATTRIBUTE_PREFETCH_SUMMARY: &str = "attributeprefetch";

/// Name of the synthesized distance field for a position field
pub fn distance_summary_field_name(field_name: &str) -> String {
    format!("{}.distance", field_name)
}

/// Name of the synthesized position field for a position field
pub fn position_summary_field_name(field_name: &str) -> String {
    format!("{}.position", field_name)
}
