//! Command-line interface for taxform.
//!
//! # Available Commands
//!
//! - `parse` - Parse a template source and report its structure
//! - `validate` - Run the template pre-check, or full validation of form data
//! - `export` - Validate, serialise and round-trip-verify form data
//! - `catalogue` - List the forms of a template set
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging
//! - `--quiet` - Only errors
//! - `--config` - Engine configuration file (falls back to `$TAXFORM_CONFIG`)
//!
//! # Example
//!
//! ```bash
//! taxform parse 01_GTGT.xml --form-code 01/GTGT --check
//! taxform validate 01_GTGT.xml --form-code 01/GTGT --data declaration.json
//! taxform export 01_GTGT.xml --form-code 01/GTGT --data declaration.json -o out.xml
//! ```
//!
//! Every command exits with status 1 when its result is fatal or invalid.

mod catalogue;
pub mod common;
mod export;
mod parse;
pub mod validate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use common::CommandContext;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests and embedders can run commands with an
/// explicit log level and configuration path.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`, then `warn`.
    pub log_level: Option<String>,

    /// Suppress informational output.
    pub quiet: bool,

    /// Engine configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, logging to stderr.
    ///
    /// Does nothing when a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    }
}

/// Tax-form template engine
#[derive(Parser, Debug)]
#[command(
    name = "taxform",
    about = "Tax-form template engine - parse, validate and export declarations",
    version,
    long_about = "taxform parses tax-form templates, validates filled form data against them \
                  and exports declaration documents that are verified by re-reading them."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an engine configuration file (TOML).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a template source and report its structure.
    Parse(parse::ParseCommand),

    /// Validate a template, or form data against it.
    Validate(validate::ValidateCommand),

    /// Export form data to a declaration document.
    Export(export::ExportCommand),

    /// List the forms offered by a template set's menu.
    Catalogue(catalogue::CatalogueCommand),
}

impl Cli {
    /// Execute the CLI with configuration built from the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    ///
    /// `--verbose` maps to `debug`, `--quiet` to `error`; otherwise `RUST_LOG`
    /// decides.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Execute the CLI with a specific configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let engine = EngineConfig::load_with_optional(config.config_path.clone())
            .await
            .context("Failed to load engine configuration")?;
        let ctx = CommandContext::new(engine, config.quiet);

        match self.command {
            Commands::Parse(cmd) => cmd.execute(&ctx).await,
            Commands::Validate(cmd) => cmd.execute(&ctx).await,
            Commands::Export(cmd) => cmd.execute(&ctx).await,
            Commands::Catalogue(cmd) => cmd.execute(&ctx).await,
        }
    }
}
