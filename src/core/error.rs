//! Error handling for taxform
//!
//! The engine distinguishes two very different kinds of failure:
//!
//! 1. **Expected conditions** - unknown control-type codes, missing attributes,
//!    invalid field values, broken dependencies, round-trip mismatches. These are
//!    never errors in the Rust sense. They are returned as values inside
//!    [`ParseResult`](crate::parser::ParseResult),
//!    [`ValidationReport`](crate::validation::ValidationReport) and
//!    [`ExportResult`](crate::export::ExportResult). Their types live in
//!    [`crate::core::diagnostics`].
//! 2. **Operational failures** - a file that cannot be read, a configuration file
//!    with broken TOML, a data file that is not valid JSON. These are
//!    [`TaxformError`] values and propagate with `?`.
//!
//! At the CLI boundary every error is an [`anyhow::Error`]; [`user_friendly_error`]
//! turns it into an [`ErrorContext`] with details and an actionable suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use taxform::core::{TaxformError, ErrorContext};
//!
//! let context = ErrorContext::new(TaxformError::ConfigError {
//!     message: "unknown key `scoring.eror_weight`".to_string(),
//! })
//! .with_suggestion("Check the spelling of keys in taxform.toml")
//! .with_details("Configuration keys are validated strictly");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for taxform operations.
///
/// Only operational failures are represented here. Validation findings and
/// parse diagnostics are data, see [`crate::core::diagnostics`].
#[derive(Error, Debug)]
pub enum TaxformError {
    /// A file could not be read or written.
    #[error("Failed to {operation} '{path}'")]
    FileSystemError {
        /// What was being attempted ("read template file", "write document", ...)
        operation: String,
        /// The path involved
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file exists but is not valid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Configuration file was named explicitly but does not exist.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up
        path: String,
    },

    /// A form-data file could not be decoded.
    #[error("Invalid form data in '{file}': {reason}")]
    FormDataParseError {
        /// File containing the data
        file: String,
        /// Decoder message
        reason: String,
    },

    /// The XML writer failed while serialising a document.
    #[error("XML serialization failed: {reason}")]
    XmlWriteError {
        /// Writer message
        reason: String,
    },

    /// A template could not be parsed and the caller asked for a hard failure.
    #[error("Template for form '{form_code}' failed to parse with {error_count} structural error(s)")]
    TemplateRejected {
        /// Form code of the template
        form_code: String,
        /// Number of fatal parse errors
        error_count: usize,
    },

    /// IO errors from [`std::io::Error`]
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing errors from [`toml::de::Error`]
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Convenience alias for results using [`TaxformError`].
pub type Result<T, E = TaxformError> = std::result::Result<T, E>;

/// Error wrapper carrying user-facing details and a suggestion.
///
/// Displayed by the binary through [`ErrorContext::display`], which colours the
/// error red, the details yellow and the suggestion green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: TaxformError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: TaxformError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognises [`TaxformError`], [`std::io::Error`], [`toml::de::Error`] and
/// [`serde_json::Error`] anywhere in the error chain; everything else is
/// reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(taxform_error) = cause.downcast_ref::<TaxformError>() {
            return create_error_context(taxform_error);
        }

        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            let context = ErrorContext::new(TaxformError::Other {
                message: error.to_string(),
            });
            return match io_error.kind() {
                std::io::ErrorKind::NotFound => context
                    .with_suggestion("Check that the file exists and the path is correct")
                    .with_details(io_error.to_string()),
                std::io::ErrorKind::PermissionDenied => context
                    .with_suggestion("Check file permissions and ownership")
                    .with_details(io_error.to_string()),
                _ => context.with_details(io_error.to_string()),
            };
        }

        if let Some(toml_error) = cause.downcast_ref::<toml::de::Error>() {
            return ErrorContext::new(TaxformError::ConfigError {
                message: toml_error.to_string(),
            })
            .with_suggestion("Check the TOML syntax of your taxform.toml")
            .with_details(
                "TOML errors are usually caused by missing quotes or mismatched brackets",
            );
        }

        if let Some(json_error) = cause.downcast_ref::<serde_json::Error>() {
            return ErrorContext::new(TaxformError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Form data must be a JSON object with `values` and `rows` keys")
            .with_details(json_error.to_string());
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(TaxformError::Other {
        message,
    })
}

fn create_error_context(error: &TaxformError) -> ErrorContext {
    match error {
        TaxformError::FileSystemError {
            operation,
            path,
            source,
        } => {
            let suggestion = match source.kind() {
                std::io::ErrorKind::PermissionDenied => "Check file permissions and ownership",
                _ => "Check that the path exists and is accessible",
            };
            ErrorContext::new(TaxformError::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            })
            .with_suggestion(suggestion)
            .with_details(source.to_string())
        }
        TaxformError::ConfigError {
            message,
        } => ErrorContext::new(TaxformError::ConfigError {
            message: message.clone(),
        })
        .with_suggestion("Fix the configuration file or remove it to use defaults")
        .with_details(format!(
            "The configuration is read from ${}",
            crate::constants::CONFIG_ENV_VAR
        )),
        TaxformError::ConfigNotFound {
            path,
        } => ErrorContext::new(TaxformError::ConfigNotFound {
            path: path.clone(),
        })
        .with_suggestion("Pass an existing file with --config or unset TAXFORM_CONFIG"),
        TaxformError::FormDataParseError {
            file,
            reason,
        } => ErrorContext::new(TaxformError::FormDataParseError {
            file: file.clone(),
            reason: reason.clone(),
        })
        .with_suggestion("Form data must be a JSON object with `values` and `rows` keys"),
        TaxformError::TemplateRejected {
            form_code,
            error_count,
        } => ErrorContext::new(TaxformError::TemplateRejected {
            form_code: form_code.clone(),
            error_count: *error_count,
        })
        .with_suggestion("Run `taxform parse` on the template to list every structural error"),
        other => ErrorContext::new(TaxformError::Other {
            message: other.to_string(),
        }),
    }
}
