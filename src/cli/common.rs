//! Common utilities for CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use crate::cache::TemplateCache;
use crate::config::EngineConfig;
use crate::core::TaxformError;
use crate::model::{FormDataInstance, Template};
use crate::parser::ParseResult;
use crate::validation::{RuleRegistry, ValidationReport};

/// Output format shared by every subcommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, coloured text
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// State shared by every command of one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Engine configuration
    pub config: EngineConfig,
    /// Template cache (one per process)
    pub cache: TemplateCache,
    /// Suppress informational output
    pub quiet: bool,
}

impl CommandContext {
    /// Create a context around a loaded configuration.
    #[must_use]
    pub fn new(config: EngineConfig, quiet: bool) -> Self {
        let cache = TemplateCache::new(config.clone());
        Self {
            config,
            cache,
            quiet,
        }
    }

    /// Read and parse a template source through the cache.
    ///
    /// A template that fails to parse is not an error here; callers inspect
    /// [`ParseResult::success`].
    pub async fn parse_template_file(
        &self,
        path: &Path,
        form_code: &str,
    ) -> Result<Arc<ParseResult>> {
        let source = read_text(path, "template").await?;
        let result = self.cache.get_or_parse(&source, form_code).await?;
        Ok(result)
    }
}

/// Read a UTF-8 file, naming what it is on failure.
pub async fn read_text(path: &Path, what: &str) -> Result<String> {
    let content = tokio::fs::read_to_string(path).await.map_err(|source| {
        TaxformError::FileSystemError {
            operation: format!("read {what} file"),
            path: path.display().to_string(),
            source,
        }
    })?;
    Ok(content)
}

/// Load form data from a JSON file.
pub async fn load_instance(path: &Path) -> Result<FormDataInstance> {
    let content = read_text(path, "form data").await?;
    let instance = serde_json::from_str(&content).map_err(|e| TaxformError::FormDataParseError {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(instance)
}

/// Build a rule registry, loading an adjustment map when one is given.
pub async fn load_rules(path: Option<&Path>) -> Result<RuleRegistry> {
    let mut rules = RuleRegistry::new();
    if let Some(path) = path {
        let source = read_text(path, "adjustment map").await?;
        let added = rules
            .load_adjustment_map(&source)
            .with_context(|| format!("Invalid adjustment map {}", path.display()))?;
        tracing::debug!("Registered {} rule(s) from {}", added, path.display());
    }
    Ok(rules)
}

/// The parsed template, or a [`TaxformError::TemplateRejected`] after the
/// structural errors have been printed.
pub fn require_template<'a>(
    result: &'a ParseResult,
    form_code: &str,
    format: OutputFormat,
) -> Result<&'a Template> {
    if let Some(template) = result.template.as_ref().filter(|_| result.success) {
        return Ok(template);
    }
    if format == OutputFormat::Text {
        print_parse_diagnostics(result);
    }
    Err(TaxformError::TemplateRejected {
        form_code: form_code.to_string(),
        error_count: result.errors.len(),
    }
    .into())
}

/// Print parse errors and warnings to stderr.
pub fn print_parse_diagnostics(result: &ParseResult) {
    for error in &result.errors {
        eprintln!("{} {}", "✗".red(), error);
    }
    for warning in &result.warnings {
        eprintln!("{} {}", "⚠".yellow(), warning);
    }
}

/// Print every issue of a report, errors first.
pub fn print_report(report: &ValidationReport) {
    for issue in report.errors() {
        eprintln!("{} {}", "✗".red(), issue);
    }
    for issue in report.warnings() {
        eprintln!("{} {}", "⚠".yellow(), issue);
    }
}

/// Serialise a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
