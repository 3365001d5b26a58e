//! Reading exported documents back against a template.
//!
//! Used by the exporter's round-trip check and by callers that need to load a
//! previously exported declaration into a [`FormDataInstance`].

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::xml::{XmlNode, parse_tree};
use crate::config::EngineConfig;
use crate::constants::{ROW_ID_PREFIX, SIGNING_DATE_FORMAT, xml};
use crate::core::StructuralParseError;
use crate::model::{Field, FormDataInstance, RowValues, Signature, Template};

/// One row recovered from a dynamic-section container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRecord {
    /// Ordinal parsed from the row id (`ID_n`), when well-formed
    pub ordinal: Option<usize>,
    /// Template-view row number
    pub template_row: Option<u64>,
    /// Report-view row number
    pub report_row: Option<u64>,
    /// Values keyed by row-relative path, for row-template fields found in the row
    pub values: RowValues,
}

/// Values recovered from an exported document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveredDocument {
    /// Form code declared on the body element
    pub form_code: Option<String>,
    /// Template version declared on the body element
    pub template_version: Option<String>,
    /// Static values keyed by path, for template fields found in the document
    pub values: BTreeMap<String, String>,
    /// Rows keyed by table id, in document order
    pub rows: BTreeMap<String, Vec<RowRecord>>,
    /// Signer name, when the document carries one
    pub signer: Option<String>,
    /// Signing date as written (`dd/mm/yyyy`)
    pub signing_date: Option<String>,
}

impl RecoveredDocument {
    /// Convert into a draft instance for further editing.
    #[must_use]
    pub fn into_instance(self, template: &Template) -> FormDataInstance {
        let mut instance = FormDataInstance::new(
            self.form_code.unwrap_or_else(|| template.form_code().to_string()),
            self.template_version.unwrap_or_else(|| template.version().to_string()),
        );
        for (path, value) in self.values {
            instance.set_value(path, value);
        }
        for (table_id, rows) in self.rows {
            for row in rows {
                instance.push_row(table_id.clone(), row.values);
            }
        }
        if let (Some(signer), Some(date)) = (self.signer, self.signing_date)
            && let Ok(date) = NaiveDate::parse_from_str(date.trim(), SIGNING_DATE_FORMAT)
        {
            instance.set_signature(Signature::new(signer, date));
        }
        instance
    }
}

/// Read an exported document, locating every template field by its path.
///
/// Only structure the template describes is recovered; anything else in the
/// document is ignored.
///
/// # Errors
///
/// Returns a [`StructuralParseError`] when the document is not well-formed or
/// its root/body elements are not the configured ones.
pub fn read_document(
    source: &str,
    template: &Template,
    config: &EngineConfig,
) -> Result<RecoveredDocument, StructuralParseError> {
    let root = parse_tree(source, &config.document.root)?;
    let body = root.child(&config.document.body).ok_or_else(|| {
        StructuralParseError::MalformedRoot {
            expected: config.document.body.clone(),
            found: root.children.first().map(|c| c.name.clone()).unwrap_or_default(),
        }
    })?;

    let mut recovered = RecoveredDocument {
        form_code: body.attr(xml::ATTR_FORM_CODE).map(ToString::to_string),
        template_version: body.attr(xml::ATTR_TEMPLATE_VERSION).map(ToString::to_string),
        ..RecoveredDocument::default()
    };

    for field in template.static_fields() {
        if let Some(node) = body.find_path(&field.path) {
            recovered.values.entry(field.path.clone()).or_insert_with(|| node.text.clone());
        }
    }

    // A template field at the signing location owns it.
    let signing_text = |path: &str| {
        template
            .static_field_by_path(path)
            .is_none()
            .then(|| body.find_path(path).map(|node| node.text.clone()))
            .flatten()
    };
    recovered.signer = signing_text(&config.document.signer_path);
    recovered.signing_date = signing_text(&config.document.signing_date_path);

    for (_, table) in template.dynamic_sections() {
        let Some(container) = body.find_path(&table.table_path) else {
            continue;
        };
        let rows = container
            .children_named(&config.document.row_element)
            .map(|row| read_row(row, &table.row_template))
            .collect();
        recovered.rows.insert(table.table_id.clone(), rows);
    }

    tracing::debug!(
        target: "parser",
        "Read document: {} value(s), {} table(s)",
        recovered.values.len(),
        recovered.rows.len()
    );

    Ok(recovered)
}

fn read_row(row: &XmlNode, row_template: &[Field]) -> RowRecord {
    let ordinal = row
        .attr(xml::ATTR_ROW_ID)
        .and_then(|id| id.strip_prefix(ROW_ID_PREFIX))
        .and_then(|n| n.parse().ok());
    let number = |name: &str| row.attr(name).and_then(|v| v.trim().parse().ok());

    let mut values = RowValues::new();
    for field in row_template {
        if let Some(node) = row.find_path(&field.path) {
            values.entry(field.path.clone()).or_insert_with(|| node.text.clone());
        }
    }

    RowRecord {
        ordinal,
        template_row: number(xml::ATTR_ROW_TEMPLATE),
        report_row: number(xml::ATTR_ROW_REPORT),
        values,
    }
}
