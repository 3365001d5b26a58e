//! Core types shared by every component
//!
//! - [`error`] - operational errors ([`TaxformError`]) and the user-facing
//!   [`ErrorContext`] used by the binary
//! - [`diagnostics`] - the structured findings the engine returns instead of
//!   failing: parse errors, schema warnings, template defects and export
//!   compliance errors
//!
//! The split mirrors the engine's propagation policy: expected conditions are
//! values, only I/O and configuration problems are errors.

pub mod diagnostics;
pub mod error;

pub use diagnostics::{
    ComplianceErrorKind, ExportComplianceError, SchemaWarning, StructuralParseError,
    TemplateDefect,
};
pub use error::{ErrorContext, Result, TaxformError, user_friendly_error};
