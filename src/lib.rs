//! taxform - tax-form template engine
//!
//! Government tax declarations are described by templates: an XML source
//! listing every field a form has, where its value lives in the exported
//! document, how it is typed and how fields depend on one another. taxform
//! turns such a source into an immutable in-memory [`Template`](model::Template),
//! validates filled form data against it and exports declaration documents
//! that are verified by reading them back.
//!
//! # Architecture Overview
//!
//! ```text
//! template source ──parse──▶ Template ──resolve──▶ dependency graph
//!                                │                        │
//!   FormDataInstance ──validate (3 passes)◀───────────────┘
//!           │                    │
//!           │              ValidationReport (score)
//!           └──export──▶ XML document ──re-read──▶ ExportResult
//! ```
//!
//! - Templates are immutable once parsed and are shared through the
//!   [`cache::TemplateCache`], which parses each distinct source once even
//!   under concurrent first requests.
//! - Expected problems (bad attributes, invalid values, round-trip mismatches)
//!   are data in result values, never panics or `Err`s.
//! - Validation accumulates everything it finds: field checks, business rules
//!   and structural checks all run to completion.
//!
//! # Core Modules
//!
//! ## Model and Parsing
//! - [`model`] - Fields, control types, sections, templates and form data
//! - [`parser`] - Template sources and exported documents
//! - [`resolver`] - Parent/child field dependency graph
//! - [`catalogue`] - Form catalogue (`Menu.xml`) and dropdown pairings
//!
//! ## Checking and Output
//! - [`validation`] - Three-pass validation and scoring
//! - [`export`] - Document serialisation with round-trip verification
//! - [`cache`] - Single-flight template cache
//!
//! ## Supporting Modules
//! - [`config`] - Engine configuration (TOML)
//! - [`constants`] - Template dialect names and policy defaults
//! - [`core`] - Error types and diagnostics
//! - [`cli`] - The `taxform` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use taxform::config::EngineConfig;
//! use taxform::export::export_document;
//! use taxform::model::FormDataInstance;
//! use taxform::parser::parse_template;
//! use taxform::validation::{RuleRegistry, validate};
//!
//! # fn main() -> taxform::core::Result<()> {
//! let config = EngineConfig::default();
//! let source = std::fs::read_to_string("templates/01_GTGT.xml")?;
//! let parsed = parse_template(&source, "01/GTGT", &config);
//! let Some(template) = parsed.template else {
//!     for error in &parsed.errors {
//!         eprintln!("{error}");
//!     }
//!     return Ok(());
//! };
//!
//! let mut data = FormDataInstance::for_template(&template);
//! data.set_value("TTinChung/NNT/mst", "0123456789");
//!
//! let report = validate(&template, &data, &RuleRegistry::new(), &config);
//! data.apply_report(&report);
//! println!("score {}", report.score(&config.scoring));
//!
//! let export = export_document(&template, &data, &config)?;
//! if data.mark_exported(export.compliance_ok) {
//!     std::fs::write("declaration.xml", &export.document)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalogue;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod export;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
