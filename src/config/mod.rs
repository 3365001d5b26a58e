//! Engine configuration
//!
//! The engine runs with sensible defaults; a TOML file can override the template
//! dialect (root element), the exported document shape, the accepted date
//! formats and the scoring policy.
//!
//! # Lookup Order
//!
//! 1. An explicit path (`--config` on the command line)
//! 2. The `TAXFORM_CONFIG` environment variable
//! 3. Built-in defaults
//!
//! An explicitly named file that does not exist is an error; there is no
//! implicit default location.
//!
//! # Example
//!
//! ```toml
//! template_root = "Template"
//! date_formats = ["%d/%m/%Y", "%Y-%m-%d"]
//!
//! [document]
//! root = "HSoThueDTu"
//! body = "HSoKhaiThue"
//! row_element = "Row"
//! signing_date_path = "TTinChung/TTinTKhaiThue/TKhaiThue/ngayKy"
//! signer_path = "TTinChung/TTinTKhaiThue/TKhaiThue/nguoiKy"
//!
//! [scoring]
//! error_weight = 5
//! warning_weight = 2
//!
//! [validation]
//! strict_unknown_paths = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_DATE_FORMATS, DEFAULT_DOCUMENT_BODY, DEFAULT_DOCUMENT_ROOT,
    DEFAULT_ERROR_WEIGHT, DEFAULT_ROW_ELEMENT, DEFAULT_SIGNER_PATH, DEFAULT_SIGNING_DATE_PATH,
    DEFAULT_TEMPLATE_ROOT, DEFAULT_WARNING_WEIGHT,
};
use crate::core::{Result, TaxformError};
use crate::model::is_resolvable_path;

/// Top-level engine configuration.
///
/// Constructed once (usually by the binary) and passed by reference to the
/// parser, validator and exporter. All fields have defaults so a partial file
/// is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Expected root element of template sources.
    pub template_root: String,

    /// `chrono` format strings accepted for DATE fields, tried in order.
    pub date_formats: Vec<String>,

    /// Shape of exported documents.
    pub document: DocumentConfig,

    /// Score weights.
    pub scoring: ScoringPolicy,

    /// Validation behaviour switches.
    pub validation: ValidationConfig,
}

/// Element names used when writing and re-reading exported documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentConfig {
    /// Document root element.
    pub root: String,
    /// Body element under the root; field paths are relative to it.
    pub body: String,
    /// Element written for each dynamic-section row.
    pub row_element: String,
    /// Body-relative path of the signing date.
    pub signing_date_path: String,
    /// Body-relative path of the signer name.
    pub signer_path: String,
}

/// Score deductions applied by
/// [`ValidationReport::score`](crate::validation::ValidationReport::score).
///
/// The score starts at 100 and never goes below 0. Weights are unsigned, so
/// adding an issue can never raise the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    /// Points deducted per error.
    pub error_weight: u32,
    /// Points deducted per warning.
    pub warning_weight: u32,
}

/// Validation switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Report values for paths the template does not know as errors instead of warnings.
    pub strict_unknown_paths: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_root: DEFAULT_TEMPLATE_ROOT.to_string(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(ToString::to_string).collect(),
            document: DocumentConfig::default(),
            scoring: ScoringPolicy::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_DOCUMENT_ROOT.to_string(),
            body: DEFAULT_DOCUMENT_BODY.to_string(),
            row_element: DEFAULT_ROW_ELEMENT.to_string(),
            signing_date_path: DEFAULT_SIGNING_DATE_PATH.to_string(),
            signer_path: DEFAULT_SIGNER_PATH.to_string(),
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            error_weight: DEFAULT_ERROR_WEIGHT,
            warning_weight: DEFAULT_WARNING_WEIGHT,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional explicit path.
    ///
    /// Falls back to `$TAXFORM_CONFIG`, then to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file is missing, unreadable or invalid.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
        match path {
            Some(path) => Self::load_from(&path).await,
            None => {
                tracing::debug!(target: "config", "No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`TaxformError::ConfigNotFound`] when the file does not exist,
    /// [`TaxformError::TomlError`] when it is not valid TOML for this schema and
    /// [`TaxformError::ConfigError`] when the values are inconsistent.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(TaxformError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).await?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(target: "config", "Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text and check it for consistency.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, unknown keys or inconsistent values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let names = [
            ("template_root", &self.template_root),
            ("document.root", &self.document.root),
            ("document.body", &self.document.body),
            ("document.row_element", &self.document.row_element),
        ];
        for (key, value) in names {
            if !is_xml_name(value) {
                return Err(TaxformError::ConfigError {
                    message: format!("{key} = {value:?} is not a valid XML element name"),
                });
            }
        }

        let paths = [
            ("document.signing_date_path", &self.document.signing_date_path),
            ("document.signer_path", &self.document.signer_path),
        ];
        for (key, value) in paths {
            if !is_resolvable_path(value) {
                return Err(TaxformError::ConfigError {
                    message: format!("{key} = {value:?} is not a valid element path"),
                });
            }
        }
        if self.document.signing_date_path == self.document.signer_path {
            return Err(TaxformError::ConfigError {
                message: "document.signing_date_path and document.signer_path must differ"
                    .to_string(),
            });
        }

        if self.date_formats.is_empty() {
            return Err(TaxformError::ConfigError {
                message: "date_formats must list at least one format".to_string(),
            });
        }

        Ok(())
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}
