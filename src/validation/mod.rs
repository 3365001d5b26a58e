//! Three-pass validation of form data against a template.
//!
//! | Pass | Module | Checks |
//! |------|--------|--------|
//! | 1 | [`field_checks`] | required-but-blank, type/format, length, numeric range |
//! | 2 | [`rules`] | caller-registered business rules for the form code |
//! | 3 | [`structural`] | template defects, required-but-absent, cascading guards, row limits, unknown paths |
//!
//! Every pass runs to completion and all findings are accumulated, so one call
//! gives the caller the complete picture. Validity means zero errors across all
//! passes; warnings only lower the score.
//!
//! A required field is reported once: as a field error when its value is
//! present but blank, as a structural error when the instance has no value for
//! it at all.

pub mod field_checks;
pub mod report;
pub mod rules;
pub mod structural;

pub use report::{Issue, IssueCategory, Severity, ValidationReport};
pub use rules::{BusinessRule, RuleCheck, RuleRegistry, RuleSeverity};

use crate::config::EngineConfig;
use crate::model::{FormDataInstance, Template};
use crate::resolver::resolve_dependencies;

/// Structural-only pre-check of a template.
///
/// Reports dependency defects, inverted ranges, cascading fields without a
/// parent, duplicate ids and paths, unresolvable paths and conflicting tables.
#[must_use]
pub fn validate_template(template: &Template) -> ValidationReport {
    let resolution = resolve_dependencies(template);
    let mut report = ValidationReport::default();
    report.extend(structural::template_defects(template, &resolution));

    tracing::debug!(
        target: "validation",
        "Template {} pre-check: {} error(s), {} warning(s)",
        template.form_code(),
        report.error_count(),
        report.warning_count()
    );
    report
}

/// Full three-pass validation of an instance.
#[must_use]
pub fn validate(
    template: &Template,
    instance: &FormDataInstance,
    rules: &RuleRegistry,
    config: &EngineConfig,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    // Pass 1
    for field in template.static_fields() {
        if let Some(value) = instance.value(&field.path) {
            report.extend(field_checks::check_value(
                field,
                value,
                &field.path,
                &config.date_formats,
            ));
        }
    }
    for (_, table) in template.dynamic_sections() {
        for (index, row) in instance.rows(&table.table_id).iter().enumerate() {
            for field in &table.row_template {
                if let Some(value) = row.get(&field.path) {
                    let location =
                        structural::row_location(&table.table_id, index + 1, &field.path);
                    report.extend(field_checks::check_value(
                        field,
                        value,
                        &location,
                        &config.date_formats,
                    ));
                }
            }
        }
    }

    // Pass 2
    for rule in rules.rules_for(template.form_code()) {
        let field = template
            .field(&rule.field_id)
            .filter(|_| !template.is_row_field(&rule.field_id));
        let value = field.and_then(|field| instance.value(&field.path));
        if !rule.holds(value, instance) {
            report.push(Issue::new(
                rule.severity.on_failure(),
                IssueCategory::BusinessRule,
                Some(&rule.field_id),
                field.map_or("", |field| field.path.as_str()),
                format!("{}: {}", rule.id, rule.message),
            ));
        }
    }

    // Pass 3
    let resolution = resolve_dependencies(template);
    report.extend(structural::template_defects(template, &resolution));
    report.extend(structural::instance_issues(template, &resolution, instance, config));

    tracing::debug!(
        target: "validation",
        "Validated {} instance: {} error(s), {} warning(s), score {}",
        template.form_code(),
        report.error_count(),
        report.warning_count(),
        report.score(&config.scoring)
    );
    report
}
