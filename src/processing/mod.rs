//! Schema processing passes

pub mod implicit_summaries;
pub mod validation;

pub use implicit_summaries::ImplicitSummaries;
pub use validation::{validate_summary_field, Verdict};

use crate::config::SummaryConfig;
use crate::diagnostics::Reporter;
use crate::error::Result;
use crate::schema::Schema;

/// Runs summary derivation with flags taken from configuration
pub fn derive_summaries(schema: &mut Schema, config: &SummaryConfig, reporter: &mut dyn Reporter) -> Result<()> {
    ImplicitSummaries::new(reporter).process(schema, config.validate, config.documents_only)
}
