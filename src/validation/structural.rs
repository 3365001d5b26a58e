//! Pass 3: template integrity and instance structure.

use std::collections::{HashMap, HashSet};

use super::report::{Issue, IssueCategory, Severity};
use crate::config::EngineConfig;
use crate::core::TemplateDefect;
use crate::model::{Field, FormDataInstance, RowValues, Template, is_resolvable_path};
use crate::resolver::Resolution;

/// Location string for a value inside a dynamic-section row (1-based ordinal).
#[must_use]
pub fn row_location(table_id: &str, ordinal: usize, path: &str) -> String {
    format!("{table_id}[{ordinal}]/{path}")
}

fn defect(defect: &TemplateDefect, field_id: Option<&str>, path: &str) -> Issue {
    Issue::error(IssueCategory::Structural, field_id, path, defect.to_string())
}

/// Defects of the template itself, independent of any data.
pub fn template_defects(template: &Template, resolution: &Resolution<'_>) -> Vec<Issue> {
    let mut issues = Vec::new();

    for error in &resolution.structural_errors {
        let field_id = match error {
            TemplateDefect::DanglingDependency {
                field_id, ..
            } => Some(field_id.as_str()),
            TemplateDefect::DependencyCycle {
                chain,
            } => chain.first().map(String::as_str),
            _ => None,
        };
        let path = field_id.and_then(|id| template.field(id)).map_or("", |f| f.path.as_str());
        issues.push(defect(error, field_id, path));
    }

    let mut seen_ids = HashSet::new();
    for field in template.fields() {
        if !seen_ids.insert(field.id.as_str()) {
            let error = TemplateDefect::DuplicateFieldId {
                field_id: field.id.clone(),
            };
            issues.push(defect(&error, Some(&field.id), &field.path));
        }
        issues.extend(field_defects(template, field));
    }

    issues.extend(path_collisions(template));
    issues.extend(table_defects(template));
    issues
}

fn field_defects(template: &Template, field: &Field) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let (Some(min), Some(max)) = (field.min_value, field.max_value)
        && field.has_inverted_range()
    {
        let error = TemplateDefect::InvertedRange {
            field_id: field.id.clone(),
            min: min.to_string(),
            max: max.to_string(),
        };
        issues.push(defect(&error, Some(&field.id), &field.path));
    }

    if field.control_type.requires_parent() && field.parent_field_id.is_none() {
        let error = TemplateDefect::MissingParent {
            field_id: field.id.clone(),
        };
        issues.push(defect(&error, Some(&field.id), &field.path));
    }

    if !is_resolvable_path(&field.path) {
        let error = TemplateDefect::InvalidPath {
            field_id: field.id.clone(),
            path: field.path.clone(),
        };
        issues.push(defect(&error, Some(&field.id), &field.path));
    }

    if let Some(selected) = &field.selected_value_ref
        && template.field(selected).is_none()
    {
        issues.push(Issue::warning(
            IssueCategory::Structural,
            Some(&field.id),
            field.path.as_str(),
            format!("field '{}' stores its selection in unknown field '{selected}'", field.id),
        ));
    }

    issues
}

/// Two static fields at one path, or two row fields at one row-relative path.
fn path_collisions(template: &Template) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut scopes: Vec<Vec<&Field>> = vec![template.static_fields().collect()];
    scopes.extend(
        template.dynamic_sections().map(|(_, table)| table.row_template.iter().collect()),
    );

    for scope in scopes {
        let mut first_at: HashMap<&str, &str> = HashMap::new();
        for field in scope {
            match first_at.get(field.path.as_str()) {
                Some(first) if *first != field.id => {
                    let error = TemplateDefect::DuplicatePath {
                        path: field.path.clone(),
                        first: (*first).to_string(),
                        second: field.id.clone(),
                    };
                    issues.push(defect(&error, Some(&field.id), &field.path));
                }
                Some(_) => {}
                None => {
                    first_at.insert(field.path.as_str(), field.id.as_str());
                }
            }
        }
    }

    issues
}

fn table_defects(template: &Template) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut paths: HashMap<&str, &str> = HashMap::new();
    let mut ids = HashSet::new();

    for (section_id, table) in template.dynamic_sections() {
        if !is_resolvable_path(&table.table_path) {
            let error = TemplateDefect::InvalidPath {
                field_id: section_id.to_string(),
                path: table.table_path.clone(),
            };
            issues.push(defect(&error, None, &table.table_path));
        }
        if let Some(first) = paths.insert(table.table_path.as_str(), section_id) {
            let error = TemplateDefect::DuplicateTablePath {
                table_path: table.table_path.clone(),
                first: first.to_string(),
                second: section_id.to_string(),
            };
            issues.push(defect(&error, None, &table.table_path));
        }
        if !ids.insert(table.table_id.as_str()) {
            let error = TemplateDefect::DuplicateTableId {
                table_id: table.table_id.clone(),
            };
            issues.push(defect(&error, None, &table.table_path));
        }
    }

    issues
}

/// Structural checks of an instance against its template.
pub fn instance_issues(
    template: &Template,
    resolution: &Resolution<'_>,
    instance: &FormDataInstance,
    config: &EngineConfig,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    if !instance.form_code.is_empty() && instance.form_code != template.form_code() {
        issues.push(Issue::warning(
            IssueCategory::Structural,
            None,
            "",
            format!(
                "instance belongs to form '{}', template is '{}'",
                instance.form_code,
                template.form_code()
            ),
        ));
    }

    for field in template.static_fields() {
        let value = instance.value(&field.path);
        if field.required && value.is_none() {
            issues.push(missing_required(field, field.path.clone()));
        }
        let lookup = |parent: &Field| {
            (!template.is_row_field(&parent.id)).then(|| instance.value(&parent.path))
        };
        if let Some(issue) = parent_guard(resolution, field, value, lookup) {
            issues.push(issue);
        }
    }

    for (_, table) in template.dynamic_sections() {
        let rows = instance.rows(&table.table_id);
        if table.exceeds_max_rows(rows.len()) {
            issues.push(Issue::error(
                IssueCategory::Structural,
                None,
                table.table_path.as_str(),
                format!(
                    "table '{}' has {} rows, more than the maximum {}",
                    table.table_id,
                    rows.len(),
                    table.max_rows
                ),
            ));
        }

        for (index, row) in rows.iter().enumerate() {
            let ordinal = index + 1;
            for field in &table.row_template {
                let location = row_location(&table.table_id, ordinal, &field.path);
                let value = row.get(&field.path).map(String::as_str);
                if field.required && value.is_none() {
                    issues.push(missing_required(field, location.clone()));
                }
                let lookup = |parent: &Field| {
                    parent_value(template, &table.row_template, row, instance, parent)
                };
                if let Some(mut issue) = parent_guard(resolution, field, value, lookup) {
                    issue.path = location;
                    issues.push(issue);
                }
            }
            for key in row.keys() {
                if !table.row_template.iter().any(|field| field.path == *key) {
                    issues.push(unknown_location(
                        config,
                        row_location(&table.table_id, ordinal, key),
                        format!("row value for unknown path '{key}' in table '{}'", table.table_id),
                    ));
                }
            }
        }
    }

    for path in instance.values().keys() {
        if template.static_field_by_path(path).is_none() {
            issues.push(unknown_location(
                config,
                path.clone(),
                format!("value for path '{path}' is not part of the template"),
            ));
        }
    }
    for table_id in instance.tables().keys() {
        if template.section_by_table(table_id).is_none() {
            issues.push(unknown_location(
                config,
                table_id.clone(),
                format!("rows for unknown table '{table_id}'"),
            ));
        }
    }

    issues
}

fn missing_required(field: &Field, location: String) -> Issue {
    Issue::error(
        IssueCategory::Structural,
        Some(&field.id),
        location,
        format!("required field '{}' is missing", field.id),
    )
}

fn unknown_location(config: &EngineConfig, location: String, message: String) -> Issue {
    let severity = if config.validation.strict_unknown_paths {
        Severity::Error
    } else {
        Severity::Warning
    };
    Issue::new(severity, IssueCategory::Structural, None, location, message)
}

/// Value of a parent field as seen from a row: same-row when the parent is in
/// the row template, the static value when it is static. `None` when the
/// parent sits in another table and no single value applies.
fn parent_value<'a>(
    template: &Template,
    row_template: &[Field],
    row: &'a RowValues,
    instance: &'a FormDataInstance,
    parent: &Field,
) -> Option<Option<&'a str>> {
    if row_template.iter().any(|field| field.id == parent.id) {
        return Some(row.get(&parent.path).map(String::as_str));
    }
    if template.is_row_field(&parent.id) {
        return None;
    }
    Some(instance.value(&parent.path))
}

/// A cascading field may only hold a value once its parent holds one.
fn parent_guard<'a>(
    resolution: &Resolution<'_>,
    field: &Field,
    value: Option<&str>,
    parent_value: impl Fn(&Field) -> Option<Option<&'a str>>,
) -> Option<Issue> {
    if !field.control_type.requires_parent() || value.is_none_or(|v| v.trim().is_empty()) {
        return None;
    }
    let parent = resolution.graph.parent_of(&field.id)?;
    if parent_value(parent)?.is_some_and(|v| !v.trim().is_empty()) {
        return None;
    }
    Some(Issue::error(
        IssueCategory::Structural,
        Some(&field.id),
        field.path.as_str(),
        format!("'{}' has a value but its parent field '{}' is empty", field.id, parent.id),
    ))
}
