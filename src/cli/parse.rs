//! Parse a template source and report its structure.
//!
//! ```bash
//! taxform parse templates/01_GTGT.xml --form-code 01/GTGT
//! taxform parse templates/01_GTGT.xml --form-code 01/GTGT --check --format json
//! ```
//!
//! Exits non-zero when the template fails to parse, or with `--check` when the
//! structural pre-check finds errors.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{
    CommandContext, OutputFormat, print_json, print_parse_diagnostics, print_report,
};
use crate::core::{SchemaWarning, StructuralParseError};
use crate::validation::{ValidationReport, validate_template};

/// Arguments of `taxform parse`.
#[derive(Args, Debug)]
pub struct ParseCommand {
    /// Template source file
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Form code the template belongs to (e.g. `01/GTGT`)
    #[arg(long)]
    pub form_code: String,

    /// Also run the structural template pre-check
    #[arg(long)]
    pub check: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ParseSummary<'a> {
    success: bool,
    form_code: &'a str,
    version: Option<&'a str>,
    sections: usize,
    dynamic_sections: usize,
    fields: usize,
    errors: &'a [StructuralParseError],
    warnings: &'a [SchemaWarning],
    #[serde(skip_serializing_if = "Option::is_none")]
    defects: Option<&'a ValidationReport>,
}

impl ParseCommand {
    /// Run the command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let result = ctx.parse_template_file(&self.template, &self.form_code).await?;
        let template = result.template.as_ref();
        let defects = match template {
            Some(template) if self.check => Some(validate_template(template)),
            _ => None,
        };

        match self.format {
            OutputFormat::Json => print_json(&ParseSummary {
                success: result.success,
                form_code: &self.form_code,
                version: template.map(|t| t.version()),
                sections: template.map_or(0, |t| t.sections().len()),
                dynamic_sections: template.map_or(0, |t| t.dynamic_sections().count()),
                fields: template.map_or(0, |t| t.field_count()),
                errors: &result.errors,
                warnings: &result.warnings,
                defects: defects.as_ref(),
            })?,
            OutputFormat::Text => {
                print_parse_diagnostics(&result);
                if let Some(template) = template
                    && !ctx.quiet
                {
                    println!(
                        "{} Parsed {} v{}: {} section(s), {} dynamic, {} field(s)",
                        "✓".green(),
                        template.form_code(),
                        template.version(),
                        template.sections().len(),
                        template.dynamic_sections().count(),
                        template.field_count()
                    );
                }
                if let Some(report) = &defects {
                    print_report(report);
                    if report.is_valid() && !ctx.quiet {
                        println!("{} No template defects", "✓".green());
                    }
                }
            }
        }

        if !result.success {
            bail!(
                "Template {} failed to parse with {} structural error(s)",
                self.template.display(),
                result.errors.len()
            );
        }
        if let Some(report) = defects
            && !report.is_valid()
        {
            bail!(
                "Template {} has {} structural defect(s)",
                self.template.display(),
                report.error_count()
            );
        }
        Ok(())
    }
}
