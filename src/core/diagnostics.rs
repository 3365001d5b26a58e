//! Diagnostic types returned (not thrown) by the engine.
//!
//! | Kind | Raised by | Effect |
//! |------|-----------|--------|
//! | [`StructuralParseError`] | parser | fatal, no template is returned |
//! | [`SchemaWarning`] | parser | informational, parsing succeeds |
//! | [`TemplateDefect`] | template validation | blocks compliance |
//! | [`ExportComplianceError`] | exporter round-trip | `compliance_ok = false` |
//!
//! Field-level and business-rule findings live in
//! [`crate::validation::Issue`] because they carry severity and score weight.

use serde::Serialize;
use thiserror::Error;

/// A fatal defect in a template source.
///
/// These are collected across the whole document before parsing fails so a
/// template author sees every missing attribute at once.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralParseError {
    /// The source is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Xml {
        /// Byte offset reported by the reader
        position: u64,
        /// Reader message
        message: String,
    },

    /// The document root is not the expected template element.
    #[error("expected root element <{expected}>, found <{found}>")]
    MalformedRoot {
        /// Configured root element name
        expected: String,
        /// Element actually found (empty when the document has no element)
        found: String,
    },

    /// The template declares no sections.
    #[error("template declares no sections")]
    NoSections,

    /// A field element lacks one of `CellID`, `Path` or `Controltype`.
    #[error("{}", describe_missing(.field_id, .attribute, .section, .index))]
    MissingAttribute {
        /// Id of the field when it is known
        field_id: Option<String>,
        /// Name of the missing attribute
        attribute: String,
        /// Section the element belongs to
        section: String,
        /// Position of the element within its section (0-based)
        index: usize,
    },

    /// A dynamic section lacks its table path.
    #[error("dynamic section '{section}' has no {attribute}")]
    MissingSectionAttribute {
        /// Section id
        section: String,
        /// Missing attribute
        attribute: String,
    },
}

fn describe_missing(
    field_id: &Option<String>,
    attribute: &str,
    section: &str,
    index: &usize,
) -> String {
    match field_id {
        Some(id) => {
            format!("field '{id}' in section '{section}' is missing required attribute {attribute}")
        }
        None => format!(
            "field #{} in section '{section}' is missing required attribute {attribute}",
            index + 1
        ),
    }
}

/// A non-fatal remark about a template source.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaWarning {
    /// The control-type code is not in the catalogue; the field became TEXT.
    #[error("unknown control type {code} on field '{field_id}', defaulting to TEXT")]
    UnknownControlType {
        /// Field id
        field_id: String,
        /// Raw attribute value
        code: String,
    },

    /// The template root carries no version attribute.
    #[error("template has no Version attribute, using \"unknown\"")]
    MissingVersion,

    /// An attribute the engine does not understand was ignored.
    #[error("ignored attribute {attribute} on <{element}>")]
    IgnoredAttribute {
        /// Element name
        element: String,
        /// Attribute name
        attribute: String,
    },

    /// An optional attribute had a value that could not be interpreted.
    #[error("ignored invalid {attribute}=\"{value}\" on field '{field_id}'")]
    InvalidAttribute {
        /// Field id
        field_id: String,
        /// Attribute name
        attribute: String,
        /// Raw value
        value: String,
    },

    /// An element the engine does not understand was skipped.
    #[error("ignored element <{element}> inside <{parent}>")]
    IgnoredElement {
        /// Element name
        element: String,
        /// Enclosing element
        parent: String,
    },
}

/// A defect in a parsed template that blocks compliance but not parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateDefect {
    /// A parent/child link names a field that does not exist.
    #[error("field '{field_id}' references unknown {relation} field '{missing_id}'")]
    DanglingDependency {
        /// Field holding the reference
        field_id: String,
        /// `parent` or `child`
        relation: String,
        /// Referenced id
        missing_id: String,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle: {}", .chain.join(" → "))]
    DependencyCycle {
        /// Field ids along the cycle, first id repeated at the end
        chain: Vec<String>,
    },

    /// `MinValue` is greater than `MaxValue`.
    #[error("field '{field_id}' has MinValue {min} greater than MaxValue {max}")]
    InvertedRange {
        /// Field id
        field_id: String,
        /// Declared minimum
        min: String,
        /// Declared maximum
        max: String,
    },

    /// A cascading dropdown does not name its parent.
    #[error("dependent dropdown '{field_id}' does not declare a parent field")]
    MissingParent {
        /// Field id
        field_id: String,
    },

    /// Two fields share an id.
    #[error("duplicate field id '{field_id}'")]
    DuplicateFieldId {
        /// Field id
        field_id: String,
    },

    /// Two static fields share a path.
    #[error("fields '{first}' and '{second}' share path '{path}'")]
    DuplicatePath {
        /// Shared path
        path: String,
        /// First field
        first: String,
        /// Second field
        second: String,
    },

    /// A path cannot be resolved to a position in the document.
    #[error("field '{field_id}' has unresolvable path '{path}'")]
    InvalidPath {
        /// Field id
        field_id: String,
        /// Offending path
        path: String,
    },

    /// Two dynamic sections attach rows at the same table path.
    #[error("dynamic sections '{first}' and '{second}' share table path '{table_path}'")]
    DuplicateTablePath {
        /// Shared table path
        table_path: String,
        /// First section
        first: String,
        /// Second section
        second: String,
    },

    /// Two dynamic sections share a table id.
    #[error("dynamic sections share table id '{table_id}'")]
    DuplicateTableId {
        /// Table id
        table_id: String,
    },
}

/// Kind of round-trip mismatch found after export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceErrorKind {
    /// The value was written but could not be read back.
    Missing,
    /// A different value was read back.
    Mismatch,
    /// A row's ordinal or location offsets were not preserved.
    LocationMismatch,
    /// A different number of rows was read back.
    RowCountMismatch,
    /// The document header (form code / version) was not preserved.
    HeaderMismatch,
    /// A path cannot be written as nested elements; nothing was written there.
    InvalidPath,
}

/// A value could not be written, or was not read back intact, at one location.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind:?} at '{path}': expected {expected:?}, found {found:?}")]
pub struct ExportComplianceError {
    /// Mismatch category
    pub kind: ComplianceErrorKind,
    /// Field id when the mismatch concerns a field
    pub field_id: Option<String>,
    /// Document path (rows are written as `table[n]/path`)
    pub path: String,
    /// What the exporter intended to write
    pub expected: Option<String>,
    /// What the re-parse recovered
    pub found: Option<String>,
}
