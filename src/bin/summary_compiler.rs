//! Summary Compiler CLI
//!
//! Derives document summaries for a schema and registers large rank expressions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use schema_summaries::config::OutputFormat;
use schema_summaries::{
    derive_summaries, CompilerConfig, ExpressionBody, ExpressionRegistry, InMemoryFileRegistry,
    Schema, TracingReporter,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "summary-compiler")]
#[command(about = "Derive document summaries and register large rank expressions")]
struct Cli {
    /// Config file (defaults to summaries.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the document summaries of a schema (JSON)
    Derive {
        schema: PathBuf,
        /// Accept invalid summary sources instead of failing
        #[arg(long)]
        no_validate: bool,
        /// Document-shape-only build
        #[arg(long)]
        documents_only: bool,
    },

    /// Register every file in a directory as a rank expression body
    Expressions {
        dir: PathBuf,
        /// Override the size threshold
        #[arg(short, long)]
        threshold: Option<usize>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Serialize)]
struct ExpressionListing {
    name: String,
    bytes: usize,
    checksum: String,
    reference: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CompilerConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Derive {
            schema,
            no_validate,
            documents_only,
        } => {
            let mut summary_config = config.summaries.clone();
            if no_validate {
                summary_config.validate = false;
            }
            if documents_only {
                summary_config.documents_only = true;
            }

            let mut parsed = Schema::load(&schema)
                .with_context(|| format!("reading schema {}", schema.display()))?;
            let mut reporter = TracingReporter;
            derive_summaries(&mut parsed, &summary_config, &mut reporter)?;

            print_json(&parsed.summaries, config.output.output_format)?;
            eprintln!("fingerprint: {}", parsed.summaries_fingerprint()?);
        }

        Commands::Expressions { dir, threshold } => {
            let threshold = threshold.unwrap_or(config.expressions.threshold);
            let files = Arc::new(InMemoryFileRegistry::new());
            let registry = ExpressionRegistry::with_threshold(files, threshold);

            let inlined = register_directory(&registry, &dir)?;
            let listing: Vec<_> = registry
                .all()
                .iter()
                .map(|body| ExpressionListing {
                    name: body.name().to_string(),
                    bytes: body.len(),
                    checksum: body.checksum().to_string(),
                    reference: body.reference().map(|r| r.to_string()),
                })
                .collect();

            print_json(&listing, config.output.output_format)?;
            eprintln!("{} registered, {} small enough to inline", listing.len(), inlined);
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Adds every file above the threshold; returns how many were left inline
fn register_directory(registry: &ExpressionRegistry, dir: &Path) -> anyhow::Result<usize> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let mut inlined = 0;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = std::fs::read(path)?;
        if !registry.should_register(content.len()) {
            inlined += 1;
            continue;
        }
        registry
            .add(ExpressionBody::new(name, content))
            .with_context(|| format!("registering {}", path.display()))?;
    }
    Ok(inlined)
}

fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    println!("{}", json);
    Ok(())
}
