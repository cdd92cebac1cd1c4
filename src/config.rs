//! Configuration management for the summary compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (summaries.toml)
//! - Environment variables (SUMMARIES__*)
//!
//! ## Example config file (summaries.toml):
//! ```toml
//! [expressions]
//! threshold = 8192
//!
//! [summaries]
//! validate = true
//! documents_only = false
//!
//! [output]
//! output_format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default size boundary above which an expression body is registered out-of-line
pub const DEFAULT_EXPRESSION_THRESHOLD: usize = 8192;

/// Main configuration for the compiler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Large expression settings
    #[serde(default)]
    pub expressions: ExpressionConfig,

    /// Summary derivation settings
    #[serde(default)]
    pub summaries: SummaryConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Large expression registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionConfig {
    /// Bodies longer than this many bytes go through the expression registry
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

/// Summary derivation flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Fail on invalid summary field sources
    #[serde(default = "default_true")]
    pub validate: bool,

    /// Document-shape-only build
    #[serde(default)]
    pub documents_only: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_threshold() -> usize {
    DEFAULT_EXPRESSION_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            validate: true,
            documents_only: false,
        }
    }
}

impl CompilerConfig {
    /// Load configuration, layering an optional explicit file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "summaries.toml",
            ".summaries.toml",
            "config/summaries.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "summaries") {
            let xdg_config = config_dir.config_dir().join("summaries.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SUMMARIES__EXPRESSIONS__THRESHOLD=16384 etc.
        builder = builder.add_source(
            Environment::with_prefix("SUMMARIES")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.expressions.threshold, 8192);
        assert!(config.summaries.validate);
        assert!(!config.summaries.documents_only);
    }

    #[test]
    fn test_serialize_config() {
        let config = CompilerConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[expressions]"));
        assert!(toml_str.contains("[summaries]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[expressions]\nthreshold = 100\n\n[summaries]\nvalidate = false\n").unwrap();

        let config = CompilerConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.expressions.threshold, 100);
        assert!(!config.summaries.validate);
        assert!(!config.summaries.documents_only);
    }
}
