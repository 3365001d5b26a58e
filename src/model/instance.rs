//! Runtime-filled form data.
//!
//! A [`FormDataInstance`] is created by the caller (or read from JSON), edited
//! value by value and row by row, then handed to the validator and exporter.
//! The engine itself never mutates an instance except through the explicit
//! lifecycle transitions below.
//!
//! ```text
//! Draft ──apply_report(valid)──▶ Validated ──mark_exported(ok)──▶ Exported
//!   ▲                               │                               │
//!   └──────────── any edit ─────────┴───────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::template::Template;
use crate::validation::ValidationReport;

/// Values of one dynamic-section row, keyed by row-relative field path.
pub type RowValues = BTreeMap<String, String>;

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Being edited; not yet validated or changed since validation.
    #[default]
    Draft,
    /// Validated with zero errors and unchanged since.
    Validated,
    /// Exported with a compliant document and unchanged since.
    Exported,
}

/// Who signed the declaration, and when.
///
/// Supplied by the caller; the exporter writes it but never reads a clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    /// Signer name as printed on the declaration
    pub signer: String,
    /// Signing date (ISO `yyyy-mm-dd` in JSON)
    pub date: NaiveDate,
}

impl Signature {
    /// Create a signature.
    pub fn new(signer: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            signer: signer.into(),
            date,
        }
    }
}

/// Filled values for one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormDataInstance {
    /// Form identity the data belongs to.
    pub form_code: String,
    /// Template version the data was entered against.
    pub template_version: String,
    values: BTreeMap<String, String>,
    rows: BTreeMap<String, Vec<RowValues>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<Signature>,
    status: InstanceStatus,
}

impl FormDataInstance {
    /// Create an empty draft.
    pub fn new(form_code: impl Into<String>, template_version: impl Into<String>) -> Self {
        Self {
            form_code: form_code.into(),
            template_version: template_version.into(),
            ..Self::default()
        }
    }

    /// Create an empty draft matching a template's identity.
    #[must_use]
    pub fn for_template(template: &Template) -> Self {
        Self::new(template.form_code(), template.version())
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> InstanceStatus {
        self.status
    }

    /// Value stored for a static field path.
    #[must_use]
    pub fn value(&self, path: &str) -> Option<&str> {
        self.values.get(path).map(String::as_str)
    }

    /// All static values keyed by path.
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Set a static value.
    pub fn set_value(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.values.insert(path.into(), value.into());
        self.touch();
    }

    /// Remove a static value, returning it.
    pub fn remove_value(&mut self, path: &str) -> Option<String> {
        let removed = self.values.remove(path);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Rows submitted for a table, in insertion order.
    #[must_use]
    pub fn rows(&self, table_id: &str) -> &[RowValues] {
        self.rows.get(table_id).map_or(&[], Vec::as_slice)
    }

    /// Every table with submitted rows.
    #[must_use]
    pub const fn tables(&self) -> &BTreeMap<String, Vec<RowValues>> {
        &self.rows
    }

    /// Append a row and return its 1-based ordinal.
    pub fn push_row(&mut self, table_id: impl Into<String>, row: RowValues) -> usize {
        self.touch();
        let rows = self.rows.entry(table_id.into()).or_default();
        rows.push(row);
        rows.len()
    }

    /// Set one value in an existing row (`index` is 0-based).
    ///
    /// Returns `false` when the row does not exist.
    pub fn set_row_value(
        &mut self,
        table_id: &str,
        index: usize,
        path: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        let Some(row) = self.rows.get_mut(table_id).and_then(|rows| rows.get_mut(index)) else {
            return false;
        };
        row.insert(path.into(), value.into());
        self.touch();
        true
    }

    /// Remove a row (`index` is 0-based); later rows shift up.
    pub fn remove_row(&mut self, table_id: &str, index: usize) -> Option<RowValues> {
        let rows = self.rows.get_mut(table_id)?;
        if index >= rows.len() {
            return None;
        }
        let removed = rows.remove(index);
        if rows.is_empty() {
            self.rows.remove(table_id);
        }
        self.touch();
        Some(removed)
    }

    /// Signing metadata, if the declaration has been signed.
    #[must_use]
    pub const fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Sign (or re-sign) the declaration.
    pub fn set_signature(&mut self, signature: Signature) {
        self.signature = Some(signature);
        self.touch();
    }

    /// Record a validation outcome.
    ///
    /// Moves the instance to [`InstanceStatus::Validated`] when the report has
    /// no errors, otherwise back to [`InstanceStatus::Draft`]. Returns the new
    /// state.
    pub fn apply_report(&mut self, report: &ValidationReport) -> InstanceStatus {
        self.status =
            if report.is_valid() { InstanceStatus::Validated } else { InstanceStatus::Draft };
        self.status
    }

    /// Record a compliant export.
    ///
    /// Only a validated instance can become exported; returns whether the
    /// transition happened.
    pub fn mark_exported(&mut self, compliance_ok: bool) -> bool {
        if compliance_ok && self.status == InstanceStatus::Validated {
            self.status = InstanceStatus::Exported;
            true
        } else {
            false
        }
    }

    fn touch(&mut self) {
        self.status = InstanceStatus::Draft;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Issue, IssueCategory};

    #[test]
    fn test_lifecycle() {
        let mut instance = FormDataInstance::new("01/GTGT", "2.5.4");
        assert_eq!(instance.status(), InstanceStatus::Draft);

        let clean = ValidationReport::default();
        assert_eq!(instance.apply_report(&clean), InstanceStatus::Validated);
        assert!(instance.mark_exported(true));
        assert_eq!(instance.status(), InstanceStatus::Exported);

        instance.set_value("a", "1");
        assert_eq!(instance.status(), InstanceStatus::Draft);
        assert!(!instance.mark_exported(true));
    }

    #[test]
    fn test_invalid_report_keeps_draft() {
        let mut instance = FormDataInstance::new("X", "1");
        let mut report = ValidationReport::default();
        report.push(Issue::error(IssueCategory::Field, Some("a"), "a", "bad"));
        assert_eq!(instance.apply_report(&report), InstanceStatus::Draft);
    }

    #[test]
    fn test_rows() {
        let mut instance = FormDataInstance::new("X", "1");
        assert!(instance.rows("T").is_empty());
        assert_eq!(instance.push_row("T", RowValues::new()), 1);
        assert_eq!(instance.push_row("T", RowValues::new()), 2);
        assert!(instance.set_row_value("T", 1, "ten", "B"));
        assert!(!instance.set_row_value("T", 5, "ten", "B"));
        assert_eq!(instance.rows("T")[1].get("ten").map(String::as_str), Some("B"));

        instance.apply_report(&ValidationReport::default());
        assert_eq!(instance.push_row("T", RowValues::new()), 3);
        assert_eq!(instance.status(), InstanceStatus::Draft);

        assert!(instance.remove_row("T", 0).is_some());
        assert_eq!(instance.rows("T").len(), 2);
        assert!(instance.remove_row("T", 3).is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut instance = FormDataInstance::new("01/GTGT", "2.5.4");
        instance.set_value("TTinChung/mst", "0123456789");
        let mut row = RowValues::new();
        row.insert("ten".to_string(), "A".to_string());
        instance.push_row("PL01", row);

        let json = serde_json::to_string(&instance).unwrap();
        assert!(json.contains("\"formCode\""));
        let back: FormDataInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, instance);
    }

    #[test]
    fn test_signature_is_optional_and_dated() {
        let instance: FormDataInstance = serde_json::from_str(
            r#"{"formCode":"X","signature":{"signer":"Nguyen Van A","date":"2024-12-31"}}"#,
        )
        .unwrap();
        let signature = instance.signature().unwrap();
        assert_eq!(signature.signer, "Nguyen Van A");
        assert_eq!(signature.date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        let mut unsigned = FormDataInstance::new("X", "1");
        assert!(!serde_json::to_string(&unsigned).unwrap().contains("signature"));
        unsigned.apply_report(&ValidationReport::default());
        unsigned.set_signature(signature.clone());
        assert_eq!(unsigned.status(), InstanceStatus::Draft);
    }

    #[test]
    fn test_json_minimal() {
        let instance: FormDataInstance =
            serde_json::from_str(r#"{"formCode":"X","values":{"a":"1"}}"#).unwrap();
        assert_eq!(instance.value("a"), Some("1"));
        assert_eq!(instance.status(), InstanceStatus::Draft);
    }
}
