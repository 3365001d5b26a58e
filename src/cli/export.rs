//! Export form data to a declaration document.
//!
//! The instance is validated first (the result is reported but does not block
//! the export unless `--require-valid` is given), then serialised and
//! re-read to confirm every value round-trips.
//!
//! ```bash
//! taxform export 01_GTGT.xml --form-code 01/GTGT --data declaration.json -o out.xml
//! taxform export 01_GTGT.xml --form-code 01/GTGT --data declaration.json > out.xml
//! ```
//!
//! Without `--output` the document goes to stdout and all diagnostics to
//! stderr. Exits non-zero when the document is not compliant.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{
    CommandContext, OutputFormat, load_instance, load_rules, print_json, print_report,
    require_template,
};
use crate::core::{ExportComplianceError, TaxformError};
use crate::export::export_document;
use crate::model::InstanceStatus;
use crate::validation::validate;

/// Arguments of `taxform export`.
#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Template source file
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Form code the template belongs to
    #[arg(long)]
    pub form_code: String,

    /// Form data (JSON) to export
    #[arg(long, value_name = "FILE")]
    pub data: PathBuf,

    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Adjustment map (XML) to register business rules from
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Refuse to export data that fails validation
    #[arg(long)]
    pub require_valid: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ExportOutput<'a> {
    compliance_ok: bool,
    valid: bool,
    score: u32,
    status: InstanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a str>,
    errors: &'a [ExportComplianceError],
    warnings: &'a [String],
}

impl ExportCommand {
    /// Run the command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let result = ctx.parse_template_file(&self.template, &self.form_code).await?;
        let template = require_template(&result, &self.form_code, self.format)?;
        let mut instance = load_instance(&self.data).await?;
        let rules = load_rules(self.rules.as_deref()).await?;

        let report = validate(template, &instance, &rules, &ctx.config);
        instance.apply_report(&report);
        if self.format == OutputFormat::Text {
            print_report(&report);
        }
        if self.require_valid && !report.is_valid() {
            bail!("Refusing to export: validation failed with {} error(s)", report.error_count());
        }

        let export = export_document(template, &instance, &ctx.config)
            .with_context(|| format!("Failed to export {}", self.data.display()))?;
        instance.mark_exported(export.compliance_ok);

        if let Some(output) = &self.output {
            tokio::fs::write(output, &export.document).await.map_err(|source| {
                TaxformError::FileSystemError {
                    operation: "write document".to_string(),
                    path: output.display().to_string(),
                    source,
                }
            })?;
        }

        match self.format {
            OutputFormat::Json => print_json(&ExportOutput {
                compliance_ok: export.compliance_ok,
                valid: report.is_valid(),
                score: report.score(&ctx.config.scoring),
                status: instance.status(),
                output: self.output.as_ref().map(|p| p.display().to_string()),
                document: self.output.is_none().then_some(export.document.as_str()),
                errors: &export.errors,
                warnings: &export.warnings,
            })?,
            OutputFormat::Text => {
                for warning in &export.warnings {
                    eprintln!("{} {}", "⚠".yellow(), warning);
                }
                for error in &export.errors {
                    eprintln!("{} {}", "✗".red(), error);
                }
                match &self.output {
                    Some(output) if !ctx.quiet => {
                        let mark = if export.compliance_ok { "✓".green() } else { "✗".red() };
                        println!("{} Wrote {} ({:?})", mark, output.display(), instance.status());
                    }
                    Some(_) => {}
                    None => print!("{}", export.document),
                }
            }
        }

        if !export.compliance_ok {
            bail!(
                "Exported document failed round-trip verification with {} error(s)",
                export.errors.len()
            );
        }
        Ok(())
    }
}
