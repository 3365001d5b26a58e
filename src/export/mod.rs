//! Document export with round-trip compliance checking.
//!
//! A filled template is serialised into the nested document its field paths
//! describe:
//!
//! ```text
//! <HSoThueDTu>
//!   <HSoKhaiThue formCode="01/GTGT" templateVersion="2.5.4">
//!     <TTinChung><NNT><mst>0123456789</mst></NNT></TTinChung>   static field "TTinChung/NNT/mst"
//!     <PLuc>
//!       <PL01>                                                  table path "PLuc/PL01"
//!         <Row id="ID_1" templateRow="12" reportRow="30">      row 1, both offsets
//!           <ten>A</ten>                                        row field "ten"
//!         </Row>
//!       </PL01>
//!     </PLuc>
//!   </HSoKhaiThue>
//! </HSoThueDTu>
//! ```
//!
//! Slash segments become nested elements and fields sharing a prefix share the
//! container. Every template field is materialised: the instance value, else
//! the field's default, else an empty element. A path with a segment that is
//! not an element name is never written; it is reported as an
//! [`ComplianceErrorKind::InvalidPath`] error instead.
//!
//! A signed instance also gets its signing date (`dd/mm/yyyy`) and signer
//! under `TTinChung/TTinTKhaiThue/TKhaiThue` (paths configurable). The date
//! comes from the instance; the exporter never reads a clock.
//!
//! After assembly the document is read back with
//! [`read_document`](crate::parser::read_document) and compared with what was
//! intended. Any difference is reported as an [`ExportComplianceError`] and
//! clears `compliance_ok`; the document is returned either way.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::constants::{ROW_ID_PREFIX, SIGNING_DATE_FORMAT, xml};
use crate::core::{ComplianceErrorKind, ExportComplianceError, Result};
use crate::model::{Field, FormDataInstance, Template, is_resolvable_path};
use crate::parser::xml::XmlNode;
use crate::parser::{RowRecord, read_document};
use crate::validation::structural::row_location;

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportResult {
    /// Serialised document (UTF-8 XML)
    pub document: String,
    /// Whether every value was written and recovered by the round-trip
    pub compliance_ok: bool,
    /// Unwritable paths and round-trip mismatches
    pub errors: Vec<ExportComplianceError>,
    /// Data that could not be placed, and other remarks
    pub warnings: Vec<String>,
}

/// One value the exporter placed.
struct Placed<'a> {
    field: &'a Field,
    value: String,
}

/// One row the exporter placed.
struct PlacedRow<'a> {
    ordinal: usize,
    template_row: u64,
    report_row: u64,
    values: Vec<Placed<'a>>,
}

/// Everything the exporter wrote, to be compared with what is read back.
#[derive(Default)]
struct WritePlan<'a> {
    statics: BTreeMap<&'a str, Placed<'a>>,
    tables: Vec<(&'a str, Vec<PlacedRow<'a>>)>,
    signer: Option<String>,
    signing_date: Option<String>,
}

/// The assembled document tree before serialisation.
struct Assembled<'a> {
    root: XmlNode,
    plan: WritePlan<'a>,
    errors: Vec<ExportComplianceError>,
    warnings: Vec<String>,
}

/// Serialise an instance and verify the result round-trips.
///
/// The instance's lifecycle state is not consulted or changed; callers record
/// a compliant export with
/// [`FormDataInstance::mark_exported`](crate::model::FormDataInstance::mark_exported).
///
/// # Errors
///
/// Returns [`TaxformError::XmlWriteError`](crate::core::TaxformError::XmlWriteError)
/// if the document cannot be written.
pub fn export_document(
    template: &Template,
    instance: &FormDataInstance,
    config: &EngineConfig,
) -> Result<ExportResult> {
    let Assembled {
        root,
        plan,
        mut errors,
        warnings,
    } = assemble(template, instance, config);
    let document = root.to_document()?;

    errors.extend(verify_round_trip(&document, template, config, &plan));
    let compliance_ok = errors.is_empty();
    if compliance_ok {
        tracing::debug!(
            target: "export",
            "Exported {} ({} bytes, {} warning(s))",
            template.form_code(),
            document.len(),
            warnings.len()
        );
    } else {
        tracing::warn!(
            target: "export",
            "Export of {} is not compliant: {} error(s)",
            template.form_code(),
            errors.len()
        );
    }

    Ok(ExportResult {
        document,
        compliance_ok,
        errors,
        warnings,
    })
}

fn assemble<'a>(
    template: &'a Template,
    instance: &FormDataInstance,
    config: &EngineConfig,
) -> Assembled<'a> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    if !instance.template_version.is_empty() && instance.template_version != template.version() {
        warnings.push(format!(
            "data was entered against template version {}, exporting with {}",
            instance.template_version,
            template.version()
        ));
    }

    let mut body = XmlNode::new(config.document.body.as_str());
    body.set_attr(xml::ATTR_FORM_CODE, template.form_code());
    body.set_attr(xml::ATTR_TEMPLATE_VERSION, template.version());

    let mut plan = WritePlan::default();
    for field in template.static_fields() {
        if !is_resolvable_path(&field.path) {
            errors.push(invalid_path(Some(field), &field.path));
            continue;
        }
        if let Some(first) = plan.statics.get(field.path.as_str()) {
            warnings.push(format!(
                "field '{}' shares path '{}' with '{}' and was not written",
                field.id, field.path, first.field.id
            ));
            continue;
        }
        let value = value_for(field, instance.value(&field.path));
        body.path_or_insert(&field.path).text.clone_from(&value);
        plan.statics.insert(field.path.as_str(), Placed {
            field,
            value,
        });
    }

    for (_, table) in template.dynamic_sections() {
        if !is_resolvable_path(&table.table_path) {
            errors.push(invalid_path(None, &table.table_path));
            continue;
        }
        let mut row_fields: Vec<&Field> = Vec::new();
        for field in &table.row_template {
            if !is_resolvable_path(&field.path) {
                errors.push(invalid_path(Some(field), &field.path));
            } else if !row_fields.iter().any(|placed| placed.path == field.path) {
                row_fields.push(field);
            }
        }

        let container = body.path_or_insert(&table.table_path);
        let mut placed_rows = Vec::new();
        for (index, row) in instance.rows(&table.table_id).iter().enumerate() {
            let ordinal = index + 1;
            let (template_row, report_row) = table.location.for_row(ordinal);
            let mut node = XmlNode::new(config.document.row_element.as_str());
            node.set_attr(xml::ATTR_ROW_ID, format!("{ROW_ID_PREFIX}{ordinal}"));
            node.set_attr(xml::ATTR_ROW_TEMPLATE, template_row.to_string());
            node.set_attr(xml::ATTR_ROW_REPORT, report_row.to_string());

            let mut values = Vec::with_capacity(row_fields.len());
            for &field in &row_fields {
                let value = value_for(field, row.get(&field.path).map(String::as_str));
                node.path_or_insert(&field.path).text.clone_from(&value);
                values.push(Placed {
                    field,
                    value,
                });
            }
            for key in row.keys() {
                if !table.row_template.iter().any(|field| field.path == *key) {
                    warnings.push(format!(
                        "row value at '{}' is not part of the template and was not written",
                        row_location(&table.table_id, ordinal, key)
                    ));
                }
            }

            container.push_child(node);
            placed_rows.push(PlacedRow {
                ordinal,
                template_row,
                report_row,
                values,
            });
        }
        plan.tables.push((table.table_id.as_str(), placed_rows));
    }

    if let Some(signature) = instance.signature() {
        let date = signature.date.format(SIGNING_DATE_FORMAT).to_string();
        let parts = [
            (&config.document.signing_date_path, date, &mut plan.signing_date),
            (&config.document.signer_path, signature.signer.clone(), &mut plan.signer),
        ];
        for (path, text, planned) in parts {
            if let Some(field) = template.static_field_by_path(path) {
                warnings.push(format!(
                    "signing metadata at '{path}' collides with field '{}' and was not written",
                    field.id
                ));
                continue;
            }
            body.path_or_insert(path).text.clone_from(&text);
            *planned = Some(text);
        }
    }

    for path in instance.values().keys() {
        if template.static_field_by_path(path).is_none() {
            warnings.push(format!(
                "value at '{path}' is not part of the template and was not written"
            ));
        }
    }
    for table_id in instance.tables().keys() {
        if template.section_by_table(table_id).is_none() {
            warnings.push(format!("rows for unknown table '{table_id}' were not written"));
        }
    }

    let mut root = XmlNode::new(config.document.root.as_str());
    root.push_child(body);
    Assembled {
        root,
        plan,
        errors,
        warnings,
    }
}

fn value_for(field: &Field, submitted: Option<&str>) -> String {
    submitted.or(field.default_value.as_deref()).unwrap_or_default().to_string()
}

fn invalid_path(field: Option<&Field>, path: &str) -> ExportComplianceError {
    ExportComplianceError {
        kind: ComplianceErrorKind::InvalidPath,
        field_id: field.map(|f| f.id.clone()),
        path: path.to_string(),
        expected: None,
        found: None,
    }
}

fn verify_round_trip(
    document: &str,
    template: &Template,
    config: &EngineConfig,
    plan: &WritePlan<'_>,
) -> Vec<ExportComplianceError> {
    let recovered = match read_document(document, template, config) {
        Ok(recovered) => recovered,
        Err(error) => {
            return vec![ExportComplianceError {
                kind: ComplianceErrorKind::Missing,
                field_id: None,
                path: config.document.root.clone(),
                expected: Some(config.document.root.clone()),
                found: Some(error.to_string()),
            }];
        }
    };

    let mut errors = Vec::new();
    let header = [
        (xml::ATTR_FORM_CODE, template.form_code(), recovered.form_code.as_deref()),
        (xml::ATTR_TEMPLATE_VERSION, template.version(), recovered.template_version.as_deref()),
    ];
    for (attribute, expected, found) in header {
        if found != Some(expected) {
            errors.push(ExportComplianceError {
                kind: ComplianceErrorKind::HeaderMismatch,
                field_id: None,
                path: format!("@{attribute}"),
                expected: Some(expected.to_string()),
                found: found.map(ToString::to_string),
            });
        }
    }

    for (path, placed) in &plan.statics {
        compare(&mut errors, Some(placed.field), path, &placed.value, recovered.values.get(*path));
    }

    let signing = [
        (&config.document.signing_date_path, &plan.signing_date, &recovered.signing_date),
        (&config.document.signer_path, &plan.signer, &recovered.signer),
    ];
    for (path, written, found) in signing {
        if let Some(written) = written {
            compare(&mut errors, None, path, written, found.as_ref());
        }
    }

    for (table_id, placed_rows) in &plan.tables {
        let found_rows: &[RowRecord] =
            recovered.rows.get(*table_id).map(Vec::as_slice).unwrap_or_default();
        if found_rows.len() != placed_rows.len() {
            errors.push(ExportComplianceError {
                kind: ComplianceErrorKind::RowCountMismatch,
                field_id: None,
                path: (*table_id).to_string(),
                expected: Some(placed_rows.len().to_string()),
                found: Some(found_rows.len().to_string()),
            });
        }

        for (placed, found) in placed_rows.iter().zip(found_rows) {
            let expected_location =
                (Some(placed.ordinal), Some(placed.template_row), Some(placed.report_row));
            let found_location = (found.ordinal, found.template_row, found.report_row);
            if expected_location != found_location {
                errors.push(ExportComplianceError {
                    kind: ComplianceErrorKind::LocationMismatch,
                    field_id: None,
                    path: format!("{table_id}[{}]", placed.ordinal),
                    expected: Some(format!("{expected_location:?}")),
                    found: Some(format!("{found_location:?}")),
                });
            }
            for value in &placed.values {
                let location = row_location(table_id, placed.ordinal, &value.field.path);
                let found_value = found.values.get(&value.field.path);
                compare(&mut errors, Some(value.field), &location, &value.value, found_value);
            }
        }
    }

    errors
}

fn compare(
    errors: &mut Vec<ExportComplianceError>,
    field: Option<&Field>,
    location: &str,
    written: &str,
    found: Option<&String>,
) {
    let kind = match found {
        None => ComplianceErrorKind::Missing,
        Some(found) if found != written => ComplianceErrorKind::Mismatch,
        Some(_) => return,
    };
    errors.push(ExportComplianceError {
        kind,
        field_id: field.map(|f| f.id.clone()),
        path: location.to_string(),
        expected: Some(written.to_string()),
        found: found.cloned(),
    });
}
