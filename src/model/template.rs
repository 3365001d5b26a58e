//! The immutable template model.

use serde::Serialize;
use std::collections::HashMap;

use super::field::Field;
use super::section::{DynamicSection, Section};

/// Where a field definition lives inside a [`Template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldLocation {
    /// Index of the section in document order
    pub section: usize,
    /// Index of the field within the section (cells or row template)
    pub position: usize,
}

/// A parsed tax form: identity, version and ordered sections.
///
/// Templates are built once by the parser (or by [`Template::new`] in tests)
/// and never mutated afterwards, so a single instance can be shared across
/// threads behind an [`Arc`](std::sync::Arc) while many form instances are
/// validated and exported against it.
///
/// The id index is derived at construction. When two fields share an id the
/// first one in document order is the one returned by [`Template::field`];
/// the duplicate is reported by template validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    version: String,
    form_code: String,
    sections: Vec<Section>,
    #[serde(skip)]
    index: HashMap<String, FieldLocation>,
}

impl Template {
    /// Assemble a template and index its field ids.
    pub fn new(
        version: impl Into<String>,
        form_code: impl Into<String>,
        sections: Vec<Section>,
    ) -> Self {
        let mut index = HashMap::new();
        for (section_idx, section) in sections.iter().enumerate() {
            for (position, field) in section.fields().iter().enumerate() {
                index.entry(field.id.clone()).or_insert(FieldLocation {
                    section: section_idx,
                    position,
                });
            }
        }

        Self {
            version: version.into(),
            form_code: form_code.into(),
            sections,
            index,
        }
    }

    /// Template version (`"unknown"` when the source did not declare one).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Form identity the template was parsed for.
    #[must_use]
    pub fn form_code(&self) -> &str {
        &self.form_code
    }

    /// Sections in document order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a field by id.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&Field> {
        let location = self.index.get(id)?;
        self.sections.get(location.section)?.fields().get(location.position)
    }

    /// Location of a field by id.
    #[must_use]
    pub fn location(&self, id: &str) -> Option<FieldLocation> {
        self.index.get(id).copied()
    }

    /// Section that owns a field.
    #[must_use]
    pub fn section_of(&self, id: &str) -> Option<&Section> {
        self.sections.get(self.index.get(id)?.section)
    }

    /// Whether a field is part of a row template.
    #[must_use]
    pub fn is_row_field(&self, id: &str) -> bool {
        self.section_of(id).is_some_and(Section::is_dynamic)
    }

    /// All field definitions in canonical (document) order, row templates included.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(Section::fields)
    }

    /// Fields of static sections in canonical order.
    pub fn static_fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().filter(|s| !s.is_dynamic()).flat_map(Section::fields)
    }

    /// Dynamic sections in document order, with their section ids.
    pub fn dynamic_sections(&self) -> impl Iterator<Item = (&str, &DynamicSection)> {
        self.sections
            .iter()
            .filter_map(|s| s.table().map(|table| (s.id.as_str(), table)))
    }

    /// Dynamic section addressed by a table id.
    #[must_use]
    pub fn section_by_table(&self, table_id: &str) -> Option<&DynamicSection> {
        self.dynamic_sections().map(|(_, table)| table).find(|table| table.table_id == table_id)
    }

    /// Static field placed at `path`, the first one when several share it.
    #[must_use]
    pub fn static_field_by_path(&self, path: &str) -> Option<&Field> {
        self.static_fields().find(|field| field.path == path)
    }

    /// Number of field definitions.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields().len()).sum()
    }
}
