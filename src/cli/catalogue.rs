//! List the forms of a template set.
//!
//! ```bash
//! taxform catalogue Menu.xml
//! taxform catalogue Menu.xml --combos ValidCombobox.xml --format json
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{CommandContext, OutputFormat, print_json, read_text};
use crate::catalogue::{ComboRule, FormEntry, read_combo_rules, read_menu};

/// Arguments of `taxform catalogue`.
#[derive(Args, Debug)]
pub struct CatalogueCommand {
    /// Form menu (`Menu.xml`)
    #[arg(value_name = "MENU")]
    pub menu: PathBuf,

    /// Dropdown pairings (`ValidCombobox.xml`)
    #[arg(long, value_name = "FILE")]
    pub combos: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct CatalogueSummary<'a> {
    forms: &'a [FormEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    combos: Option<&'a [ComboRule]>,
}

impl CatalogueCommand {
    /// Run the command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let source = read_text(&self.menu, "menu").await?;
        let catalogue = read_menu(&source)
            .with_context(|| format!("Invalid form menu {}", self.menu.display()))?;

        let combos = match &self.combos {
            Some(path) => {
                let source = read_text(path, "dropdown").await?;
                let rules = read_combo_rules(&source)
                    .with_context(|| format!("Invalid dropdown file {}", path.display()))?;
                Some(rules)
            }
            None => None,
        };

        match self.format {
            OutputFormat::Json => print_json(&CatalogueSummary {
                forms: &catalogue.forms,
                combos: combos.as_deref(),
            })?,
            OutputFormat::Text if !ctx.quiet => {
                println!(
                    "{} {} form(s) in {}",
                    "✓".green(),
                    catalogue.len(),
                    self.menu.display()
                );
                for form in &catalogue.forms {
                    println!(
                        "  {} {} (v{}, {} active sheet(s))",
                        form.id.bold(),
                        form.caption,
                        form.version,
                        form.active_sheets().count()
                    );
                }
                if let Some(rules) = &combos {
                    println!("{} {} dropdown pairing(s)", "✓".green(), rules.len());
                }
            }
            OutputFormat::Text => {}
        }
        Ok(())
    }
}
