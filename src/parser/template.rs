//! Template source parsing.
//!
//! The parser extracts structure only: sections in document order, field
//! attributes and the control-type fallback. It never applies semantic checks
//! such as bounds consistency or dependency integrity; those belong to
//! [`crate::validation::validate_template`].
//!
//! Every fatal defect is collected before the parse fails, so a template with
//! three broken cells reports all three.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

use super::xml::{XmlNode, parse_tree};
use crate::config::EngineConfig;
use crate::constants::{UNKNOWN_VERSION, xml};
use crate::core::{SchemaWarning, StructuralParseError};
use crate::model::{
    ControlType, DynamicSection, Field, LocationInfo, Section, Template, normalize_path,
};

/// Outcome of parsing one template source.
///
/// `template` is present exactly when `success` is true, which is exactly when
/// `errors` is empty. Warnings may accompany either outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// Whether a template was produced
    pub success: bool,
    /// The parsed template on success
    pub template: Option<Template>,
    /// Fatal structural defects, in document order
    pub errors: Vec<StructuralParseError>,
    /// Non-fatal remarks, in document order
    pub warnings: Vec<SchemaWarning>,
}

impl ParseResult {
    fn failed(errors: Vec<StructuralParseError>, warnings: Vec<SchemaWarning>) -> Self {
        Self {
            success: false,
            template: None,
            errors,
            warnings,
        }
    }
}

/// Attributes understood on a `Cell` element.
const CELL_ATTRIBUTES: &[&str] = &[
    xml::ATTR_CELL_ID,
    xml::ATTR_CELL_ID2,
    xml::ATTR_PATH,
    xml::ATTR_CONTROL_TYPE,
    xml::ATTR_ENCODE,
    xml::ATTR_VALUE,
    xml::ATTR_DEFAULT_VALUE,
    xml::ATTR_MAX_LEN,
    xml::ATTR_MIN_VALUE,
    xml::ATTR_MAX_VALUE,
    xml::ATTR_HELP,
    xml::ATTR_PARENT,
    xml::ATTR_CHILD,
    xml::ATTR_SELECTED_VALUE,
    xml::ATTR_REQUIRED,
];

/// Parse a template source for a form.
///
/// Never fails with an `Err`: malformed input is reported through
/// [`ParseResult::errors`].
pub fn parse_template(source: &str, form_code: &str, config: &EngineConfig) -> ParseResult {
    let root = match parse_tree(source, &config.template_root) {
        Ok(root) => root,
        Err(error) => {
            tracing::debug!(target: "parser", "Template for {} rejected: {}", form_code, error);
            return ParseResult::failed(vec![error], Vec::new());
        }
    };

    let mut ctx = ParseContext::default();

    let version = match root.attr_non_empty(xml::ATTR_VERSION) {
        Some(version) => version.to_string(),
        None => {
            ctx.warnings.push(SchemaWarning::MissingVersion);
            UNKNOWN_VERSION.to_string()
        }
    };

    let mut sections = Vec::new();
    for child in &root.children {
        if child.name == xml::SECTION {
            let ordinal = sections.len() + ctx.dropped_sections + 1;
            match ctx.section(child, ordinal) {
                Some(section) => sections.push(section),
                None => ctx.dropped_sections += 1,
            }
        } else {
            ctx.ignore_element(child, &root.name);
        }
    }

    if sections.is_empty() && ctx.dropped_sections == 0 {
        ctx.errors.push(StructuralParseError::NoSections);
    }

    if !ctx.errors.is_empty() {
        tracing::debug!(
            target: "parser",
            "Template for {} rejected with {} error(s)",
            form_code,
            ctx.errors.len()
        );
        return ParseResult::failed(ctx.errors, ctx.warnings);
    }

    let template = Template::new(version, form_code, sections);
    tracing::debug!(
        target: "parser",
        "Parsed template {} v{}: {} section(s), {} field(s), {} warning(s)",
        form_code,
        template.version(),
        template.sections().len(),
        template.field_count(),
        ctx.warnings.len()
    );

    ParseResult {
        success: true,
        template: Some(template),
        errors: Vec::new(),
        warnings: ctx.warnings,
    }
}

#[derive(Default)]
struct ParseContext {
    errors: Vec<StructuralParseError>,
    warnings: Vec<SchemaWarning>,
    ignored_attributes: BTreeSet<String>,
    dropped_sections: usize,
}

impl ParseContext {
    /// Parse one `Section`. `None` when a fatal error was recorded for it.
    fn section(&mut self, node: &XmlNode, ordinal: usize) -> Option<Section> {
        let id = node
            .attr_non_empty(xml::ATTR_SECTION_ID)
            .map_or_else(|| format!("S{ordinal}"), ToString::to_string);
        let dynamic = node.attr_non_empty(xml::ATTR_DYNAMIC).is_some_and(is_truthy);

        if !dynamic {
            let mut cells = Vec::new();
            let mut index = 0;
            for child in &node.children {
                if child.name != xml::CELLS {
                    self.ignore_element(child, &node.name);
                    continue;
                }
                for cell in &child.children {
                    if cell.name != xml::CELL {
                        self.ignore_element(cell, &child.name);
                        continue;
                    }
                    if let Some(field) = self.cell(cell, &id, index) {
                        cells.push(field);
                    }
                    index += 1;
                }
            }
            return Some(Section::fixed(id, cells));
        }

        let table_path = node.attr_non_empty(xml::ATTR_TABLE_PATH).map(normalize_path);
        if table_path.is_none() {
            self.errors.push(StructuralParseError::MissingSectionAttribute {
                section: id.clone(),
                attribute: xml::ATTR_TABLE_PATH.to_string(),
            });
        }
        let table_id = node
            .attr_non_empty(xml::ATTR_TABLE_NAME)
            .map_or_else(|| id.clone(), ToString::to_string);
        let max_rows = self.number_attr::<usize>(node, xml::ATTR_MAX_ROWS, &id).unwrap_or(0);

        let mut location = LocationInfo::default();
        let mut row_template = Vec::new();
        let mut seen_row_info = false;
        let mut index = 0;
        for child in &node.children {
            if child.name != xml::ROW_INFO || seen_row_info {
                self.ignore_element(child, &node.name);
                continue;
            }
            seen_row_info = true;
            location = LocationInfo {
                template_row: self.number_attr(child, xml::ATTR_TEMPLATE_ROW, &id).unwrap_or(0),
                report_row: self.number_attr(child, xml::ATTR_REPORT_ROW, &id).unwrap_or(0),
            };
            for cell in &child.children {
                if cell.name != xml::CELL {
                    self.ignore_element(cell, &child.name);
                    continue;
                }
                if let Some(field) = self.cell(cell, &id, index) {
                    row_template.push(field);
                }
                index += 1;
            }
        }

        let table_path = table_path?;
        Some(Section::dynamic(
            id,
            DynamicSection {
                max_rows,
                table_id,
                table_path,
                location,
                row_template,
            },
        ))
    }

    /// Parse one `Cell`. `None` when a required attribute is missing.
    fn cell(&mut self, node: &XmlNode, section: &str, index: usize) -> Option<Field> {
        let id = node.attr_non_empty(xml::ATTR_CELL_ID);
        let path = node.attr_non_empty(xml::ATTR_PATH);
        let code = node.attr_non_empty(xml::ATTR_CONTROL_TYPE);

        for (attribute, value) in
            [(xml::ATTR_CELL_ID, id), (xml::ATTR_PATH, path), (xml::ATTR_CONTROL_TYPE, code)]
        {
            if value.is_none() {
                self.errors.push(StructuralParseError::MissingAttribute {
                    field_id: id.map(ToString::to_string),
                    attribute: attribute.to_string(),
                    section: section.to_string(),
                    index,
                });
            }
        }

        for (key, _) in &node.attrs {
            if !CELL_ATTRIBUTES.contains(&key.as_str())
                && self.ignored_attributes.insert(key.clone())
            {
                self.warnings.push(SchemaWarning::IgnoredAttribute {
                    element: node.name.clone(),
                    attribute: key.clone(),
                });
            }
        }

        let (Some(id), Some(path), Some(code)) = (id, path, code) else {
            return None;
        };

        let control_type = match code.parse::<u32>().ok().and_then(ControlType::from_code) {
            Some(control_type) => control_type,
            None => {
                tracing::warn!(
                    target: "parser",
                    "Unknown control type {} on field '{}', defaulting to TEXT",
                    code,
                    id
                );
                self.warnings.push(SchemaWarning::UnknownControlType {
                    field_id: id.to_string(),
                    code: code.to_string(),
                });
                ControlType::Text
            }
        };

        let optional = |name: &str| node.attr_non_empty(name).map(ToString::to_string);
        let mut field = Field::new(id, path, control_type);
        field.control_code = code.to_string();
        field.secondary_id = optional(xml::ATTR_CELL_ID2);
        field.value_encoded = node.attr_non_empty(xml::ATTR_ENCODE).is_some_and(is_truthy);
        field.value = node.attr(xml::ATTR_VALUE).filter(|v| !v.is_empty()).map(ToString::to_string);
        field.default_value =
            node.attr(xml::ATTR_DEFAULT_VALUE).filter(|v| !v.is_empty()).map(ToString::to_string);
        field.help_ref = optional(xml::ATTR_HELP);
        field.parent_field_id = optional(xml::ATTR_PARENT);
        field.child_field_id = optional(xml::ATTR_CHILD);
        field.selected_value_ref = optional(xml::ATTR_SELECTED_VALUE);
        field.required = node.attr_non_empty(xml::ATTR_REQUIRED).is_some_and(is_truthy);
        field.max_length = self.number_attr(node, xml::ATTR_MAX_LEN, id);
        field.min_value = self.decimal_attr(node, xml::ATTR_MIN_VALUE, id);
        field.max_value = self.decimal_attr(node, xml::ATTR_MAX_VALUE, id);

        Some(field)
    }

    fn number_attr<T: FromStr>(&mut self, node: &XmlNode, name: &str, owner: &str) -> Option<T> {
        let raw = node.attr_non_empty(name)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.invalid_attribute(owner, name, raw);
                None
            }
        }
    }

    fn decimal_attr(&mut self, node: &XmlNode, name: &str, owner: &str) -> Option<Decimal> {
        let raw = node.attr_non_empty(name)?;
        match Decimal::from_str(raw) {
            Ok(value) => Some(value),
            Err(_) => {
                self.invalid_attribute(owner, name, raw);
                None
            }
        }
    }

    fn invalid_attribute(&mut self, owner: &str, name: &str, raw: &str) {
        self.warnings.push(SchemaWarning::InvalidAttribute {
            field_id: owner.to_string(),
            attribute: name.to_string(),
            value: raw.to_string(),
        });
    }

    fn ignore_element(&mut self, node: &XmlNode, parent: &str) {
        self.warnings.push(SchemaWarning::IgnoredElement {
            element: node.name.clone(),
            parent: parent.to_string(),
        });
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
