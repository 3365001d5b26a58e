//! Template and document parsing.
//!
//! - [`parse_template`] turns a template source into a [`Template`](crate::model::Template)
//! - [`read_document`] reads an exported document back against a template
//!
//! Both share the element tree in [`xml`].

pub mod document;
pub mod template;
pub mod xml;

pub use document::{RecoveredDocument, RowRecord, read_document};
pub use template::{ParseResult, parse_template};
