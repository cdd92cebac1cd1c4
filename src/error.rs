//! Error types for summary derivation and expression registration

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Fatal compiler errors
///
/// Warnings never surface here; they flow through [`crate::diagnostics::Reporter`].
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Rank expression '{name}' defined twice. Previous blob with {previous} bytes, while current has {current} bytes")]
    ContentConflict {
        name: String,
        previous: usize,
        current: usize,
    },

    #[error("Invalid rank expression '{name}': {reason}")]
    InvalidExpression { name: String, reason: String },

    #[error("For schema '{schema}', summary field '{field}': Source field '{source_field}' does not exist.")]
    MissingSourceField {
        schema: String,
        field: String,
        source_field: String,
    },

    #[error("For schema '{schema}', summary field '{field}': Summary source attribute '{attribute}' not found.")]
    MissingSourceAttribute {
        schema: String,
        field: String,
        attribute: String,
    },

    #[error("For schema '{schema}', summary field '{field}': Expected 1 source field, got {count}.")]
    InvalidSourceCount {
        schema: String,
        field: String,
        count: usize,
    },

    #[error("Document summary stored under '{key}' is named '{name}'")]
    SummaryNameMismatch { key: String, name: String },

    #[error("Unknown summary transform: {0}")]
    UnknownTransform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl CompileError {
    /// Whether this error came out of summary field validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingSourceField { .. }
                | Self::MissingSourceAttribute { .. }
                | Self::InvalidSourceCount { .. }
        )
    }
}
