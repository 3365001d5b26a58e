//! Pass 1: per-field checks on a single submitted value.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use super::report::{Issue, IssueCategory};
use crate::model::{ControlType, Field};

/// Ten digits, optionally followed by a three-digit branch suffix.
static TAX_CODE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{10}(-\d{3})?$").ok());

/// Whether `value` is a well-formed taxpayer code.
#[must_use]
pub fn is_tax_code(value: &str) -> bool {
    TAX_CODE_PATTERN.as_ref().is_some_and(|pattern| pattern.is_match(value))
}

/// Parse a date with the first matching format.
#[must_use]
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    formats.iter().find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Check one present value against its field definition.
///
/// `location` is where the value lives (`path`, or `table[n]/path` for rows).
/// A blank value is only checked for required-ness; type, length and range
/// checks apply to non-blank values.
pub fn check_value(
    field: &Field,
    value: &str,
    location: &str,
    date_formats: &[String],
) -> Vec<Issue> {
    let mut issues = Vec::new();
    let error = |message: String| {
        Issue::error(IssueCategory::Field, Some(&field.id), location, message)
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        if field.required {
            issues.push(error(format!("required field '{}' is empty", field.id)));
        }
        return issues;
    }

    match field.control_type {
        ControlType::TaxCode if !is_tax_code(trimmed) => {
            issues.push(error(format!(
                "'{trimmed}' is not a valid tax code (10 digits, optional -NNN branch suffix)"
            )));
        }
        ControlType::Number => match Decimal::from_str(trimmed) {
            Ok(number) => {
                if let Some(min) = field.min_value
                    && number < min
                {
                    issues.push(error(format!("{number} is below the minimum {min}")));
                }
                if let Some(max) = field.max_value
                    && number > max
                {
                    issues.push(error(format!("{number} is above the maximum {max}")));
                }
            }
            Err(_) => issues.push(error(format!("'{trimmed}' is not a number"))),
        },
        ControlType::Date if parse_date(trimmed, date_formats).is_none() => {
            issues.push(error(format!(
                "'{trimmed}' is not a date in any accepted format ({})",
                date_formats.join(", ")
            )));
        }
        ControlType::Checkbox if !is_checkbox_value(trimmed) => {
            issues.push(error(format!("'{trimmed}' is not a checkbox value (0, 1, true, false)")));
        }
        _ => {}
    }

    if let Some(max_length) = field.max_length {
        let length = value.chars().count();
        if length > max_length {
            issues.push(error(format!(
                "value has {length} characters, more than the maximum {max_length}"
            )));
        }
    }

    issues
}

fn is_checkbox_value(value: &str) -> bool {
    ["0", "1", "true", "false"].iter().any(|accepted| value.eq_ignore_ascii_case(accepted))
}
