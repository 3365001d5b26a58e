//! Sections: fixed groups of fields or repeating row tables.

use serde::Serialize;

use super::field::Field;

/// Row-start offsets of a dynamic section in its two renderings.
///
/// The template view and the printed report view number rows independently.
/// Neither offset is derived from the other; both are written verbatim (plus the
/// row ordinal) on every exported row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocationInfo {
    /// First row of the table in the editable template view.
    pub template_row: u32,
    /// First row of the table in the printed report view.
    pub report_row: u32,
}

impl LocationInfo {
    /// Offsets of the row at 1-based `ordinal`.
    #[must_use]
    pub fn for_row(self, ordinal: usize) -> (u64, u64) {
        let step = ordinal.saturating_sub(1) as u64;
        (u64::from(self.template_row) + step, u64::from(self.report_row) + step)
    }
}

/// A repeating table of rows stamped out from a row template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicSection {
    /// Maximum number of rows, `0` meaning unbounded.
    pub max_rows: usize,
    /// Identifier used by form data to address the rows (`TableName`).
    pub table_id: String,
    /// Document path of the container the rows are attached to.
    pub table_path: String,
    /// Row-start offsets for both renderings.
    pub location: LocationInfo,
    /// Field definitions instantiated once per row; paths are row-relative.
    pub row_template: Vec<Field>,
}

impl DynamicSection {
    /// Whether `count` rows exceed the declared limit.
    #[must_use]
    pub fn exceeds_max_rows(&self, count: usize) -> bool {
        self.max_rows != 0 && count > self.max_rows
    }
}

/// What a section holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionKind {
    /// A fixed list of fields.
    Static {
        /// Fields in document order
        cells: Vec<Field>,
    },
    /// A repeating table.
    Dynamic(DynamicSection),
}

/// An ordered group of fields within a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Section id (`id` attribute, or `S{n}` when absent).
    pub id: String,
    /// Static cells or dynamic table.
    #[serde(flatten)]
    pub kind: SectionKind,
}

impl Section {
    /// Create a static section.
    pub fn fixed(id: impl Into<String>, cells: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            kind: SectionKind::Static {
                cells,
            },
        }
    }

    /// Create a dynamic section.
    pub fn dynamic(id: impl Into<String>, table: DynamicSection) -> Self {
        Self {
            id: id.into(),
            kind: SectionKind::Dynamic(table),
        }
    }

    /// Whether the section repeats rows.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.kind, SectionKind::Dynamic(_))
    }

    /// The section's field definitions: cells, or the row template.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            SectionKind::Static {
                cells,
            } => cells,
            SectionKind::Dynamic(table) => &table.row_template,
        }
    }

    /// Table metadata for dynamic sections.
    #[must_use]
    pub const fn table(&self) -> Option<&DynamicSection> {
        match &self.kind {
            SectionKind::Dynamic(table) => Some(table),
            SectionKind::Static {
                ..
            } => None,
        }
    }

    /// Declared row limit; `None` for static sections.
    #[must_use]
    pub fn max_rows(&self) -> Option<usize> {
        self.table().map(|table| table.max_rows)
    }
}
