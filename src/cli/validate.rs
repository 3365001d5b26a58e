//! Validate form data (or just a template) for one form.
//!
//! Without `--data` only the structural template pre-check runs. With
//! `--data` the full three-pass validation runs against the instance, using
//! the business rules of an optional adjustment map.
//!
//! ```bash
//! taxform validate 01_GTGT.xml --form-code 01/GTGT
//! taxform validate 01_GTGT.xml --form-code 01/GTGT --data declaration.json
//! taxform validate 01_GTGT.xml --form-code 01/GTGT --data declaration.json \
//!     --rules MapMCT.xml --format json
//! ```
//!
//! # JSON Output
//!
//! ```json
//! {
//!   "valid": false,
//!   "score": 93,
//!   "error_count": 1,
//!   "warning_count": 1,
//!   "report": { "field_issues": [...], "rule_issues": [...], "structural_issues": [...] }
//! }
//! ```
//!
//! Exits non-zero when the report holds any error.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{
    CommandContext, OutputFormat, load_instance, load_rules, print_json, print_report,
    require_template,
};
use crate::validation::{ValidationReport, validate, validate_template};

/// Arguments of `taxform validate`.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Template source file
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Form code the template belongs to
    #[arg(long)]
    pub form_code: String,

    /// Form data (JSON) to validate
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Adjustment map (XML) to register business rules from
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Serialized validation outcome.
#[derive(Serialize)]
pub struct ValidationOutput<'a> {
    /// Zero errors across all passes
    pub valid: bool,
    /// Score under the configured policy
    pub score: u32,
    /// Number of errors
    pub error_count: usize,
    /// Number of warnings
    pub warning_count: usize,
    /// All findings by pass
    pub report: &'a ValidationReport,
}

impl ValidateCommand {
    /// Run the command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let result = ctx.parse_template_file(&self.template, &self.form_code).await?;
        let template = require_template(&result, &self.form_code, self.format)?;

        let report = match &self.data {
            Some(data) => {
                let mut instance = load_instance(data).await?;
                let rules = load_rules(self.rules.as_deref()).await?;
                let report = validate(template, &instance, &rules, &ctx.config);
                let status = instance.apply_report(&report);
                tracing::debug!("Instance status after validation: {:?}", status);
                report
            }
            None => validate_template(template),
        };

        let score = report.score(&ctx.config.scoring);
        match self.format {
            OutputFormat::Json => print_json(&ValidationOutput {
                valid: report.is_valid(),
                score,
                error_count: report.error_count(),
                warning_count: report.warning_count(),
                report: &report,
            })?,
            OutputFormat::Text => {
                print_report(&report);
                if !ctx.quiet {
                    let subject = if self.data.is_some() { "Form data" } else { "Template" };
                    if report.is_valid() {
                        println!(
                            "{} {} is valid ({} warning(s), score {})",
                            "✓".green(),
                            subject,
                            report.warning_count(),
                            score
                        );
                    } else {
                        println!(
                            "{} {} is invalid: {} error(s), {} warning(s), score {}",
                            "✗".red(),
                            subject,
                            report.error_count(),
                            report.warning_count(),
                            score
                        );
                    }
                }
            }
        }

        if !report.is_valid() {
            bail!("Validation failed with {} error(s)", report.error_count());
        }
        Ok(())
    }
}
