//! Field (cell) definitions and path helpers.

use rust_decimal::Decimal;
use serde::Serialize;

use super::control::ControlType;

/// One addressable, typed value location in a template.
///
/// Fields of a static section are placed once in the exported document; fields
/// of a dynamic section's row template are stamped out once per row, with
/// `path` relative to the row element.
///
/// Dependency links (`parent_field_id`, `child_field_id`, `selected_value_ref`)
/// are plain ids resolved through the template index, never references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Unique id within the template (`CellID`).
    pub id: String,
    /// Secondary id used by the report view (`CellID2`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_id: Option<String>,
    /// Slash-delimited location of the value in the exported document,
    /// normalised without leading or trailing slashes.
    pub path: String,
    /// Resolved control type.
    pub control_type: ControlType,
    /// Control-type attribute exactly as written in the source.
    pub control_code: String,
    /// Whether the source marks the value as encoded.
    pub value_encoded: bool,
    /// Preset value from the template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Value used by the exporter when the instance supplies none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Maximum length in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Inclusive lower bound for NUMBER fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Decimal>,
    /// Inclusive upper bound for NUMBER fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Decimal>,
    /// Help topic reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_ref: Option<String>,
    /// Field whose value scopes this field's options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_field_id: Option<String>,
    /// Field whose options are scoped by this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_field_id: Option<String>,
    /// Field that stores the chosen option of a dropdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_value_ref: Option<String>,
    /// Whether the source marks the field as required.
    pub required: bool,
}

impl Field {
    /// Create a field with only the three mandatory attributes set.
    pub fn new(id: impl Into<String>, path: impl AsRef<str>, control_type: ControlType) -> Self {
        Self {
            id: id.into(),
            secondary_id: None,
            path: normalize_path(path.as_ref()),
            control_type,
            control_code: control_type.code().to_string(),
            value_encoded: false,
            value: None,
            default_value: None,
            max_length: None,
            min_value: None,
            max_value: None,
            help_ref: None,
            parent_field_id: None,
            child_field_id: None,
            selected_value_ref: None,
            required: false,
        }
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the parent field id.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_field_id = Some(parent.into());
        self
    }

    /// Set the child field id.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.child_field_id = Some(child.into());
        self
    }

    /// Set the maximum length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set numeric bounds.
    #[must_use]
    pub fn with_bounds(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Path split into its segments.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        split_path(&self.path)
    }

    /// `true` when both bounds are declared and the minimum exceeds the maximum.
    #[must_use]
    pub fn has_inverted_range(&self) -> bool {
        matches!((self.min_value, self.max_value), (Some(min), Some(max)) if min > max)
    }
}

/// Trim whitespace and surrounding slashes from a path.
///
/// Inner empty segments are kept so that `a//b` can be reported as a defect.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

/// Split a normalised path into segments.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(move |_| !path.is_empty())
}

/// Whether every segment of `path` can become an element name.
#[must_use]
pub fn is_resolvable_path(path: &str) -> bool {
    !path.is_empty() && split_path(path).all(is_element_name)
}

fn is_element_name(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}
