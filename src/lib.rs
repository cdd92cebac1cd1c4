//! Schema Summaries
//!
//! The summary and large-expression passes of search schema compilation.
//!
//! ## Features
//!
//! - **Summary Derivation**: Turns per-field summary declarations into named,
//!   client-facing document summaries
//! - **Attribute Prefetch**: Collects attribute-backed values into the
//!   `attributeprefetch` summary, except where dynamic summaries forbid it
//! - **Expression Registry**: Registers oversized rank expression bodies once
//!   per name, rejecting different content under the same name
//! - **Deterministic Output**: Ordered summaries with checksum fingerprints
//!
//! ## Flow
//!
//! ```text
//! FieldModel ──► ImplicitSummaries::process ──► Schema.summaries
//!                         │
//!                         └──► Reporter (warnings, errors)
//!
//! rank profiles ──► ExpressionRegistry::add ──► FileRegistry
//!                         │
//!                         └──► all() sorted by name
//! ```

pub mod checksum;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod model;
pub mod processing;
pub mod schema;
pub mod summary;

pub use checksum::Checksum;
pub use config::CompilerConfig;
pub use diagnostics::{CollectingReporter, Diagnostic, DiagnosticCode, Diagnostics, Reporter, Severity, TracingReporter};
pub use error::{CompileError, Result};
pub use expression::{ExpressionBody, ExpressionRegistry, FileReference, FileRegistry, InMemoryFileRegistry};
pub use model::{Attribute, DataType, Field, FieldModel, PrefetchOverride};
pub use processing::{derive_summaries, ImplicitSummaries};
pub use schema::Schema;
pub use summary::{DocumentSummary, MergeConflict, SummaryField, SummaryTransform};
