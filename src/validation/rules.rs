//! Cross-field business rules supplied by the caller.
//!
//! The engine defines the mechanism only: a registry keyed by form code whose
//! rules are evaluated in pass 2 of [`validate`](super::validate). Concrete
//! tax arithmetic lives with whoever registers the rules.
//!
//! # Example
//!
//! ```rust
//! use taxform::validation::{BusinessRule, RuleRegistry, RuleSeverity};
//!
//! let mut registry = RuleRegistry::new();
//! registry.register(
//!     "01/GTGT",
//!     BusinessRule::new("ct40-vs-ct23", "ct40", RuleSeverity::Business,
//!         "ct40 must not exceed ct23",
//!         |value, instance| {
//!             let total = instance.value("CTieuTKhaiChinh/ct23").and_then(|v| v.parse::<i64>().ok());
//!             match (value.and_then(|v| v.parse::<i64>().ok()), total) {
//!                 (Some(value), Some(total)) => value <= total,
//!                 _ => true,
//!             }
//!         }),
//! );
//! assert_eq!(registry.rules_for("01/GTGT").len(), 1);
//! ```

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::report::Severity;
use crate::constants::xml;
use crate::core::StructuralParseError;
use crate::model::FormDataInstance;
use crate::parser::xml::read_tree;

/// Rule predicate: receives the current value of the rule's field (if any) and
/// the whole instance; returns `true` when the rule holds.
pub type RuleCheck = Arc<dyn Fn(Option<&str>, &FormDataInstance) -> bool + Send + Sync>;

/// What a failing rule means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSeverity {
    /// Failure is an error and blocks validity.
    Business,
    /// Failure is an advisory warning.
    Format,
}

impl RuleSeverity {
    /// Report severity of a failure.
    #[must_use]
    pub const fn on_failure(self) -> Severity {
        match self {
            Self::Business => Severity::Error,
            Self::Format => Severity::Warning,
        }
    }
}

/// A named predicate over one field and the instance it belongs to.
#[derive(Clone)]
pub struct BusinessRule {
    /// Rule identifier, unique per form by convention
    pub id: String,
    /// Field whose value the rule receives
    pub field_id: String,
    /// Failure severity
    pub severity: RuleSeverity,
    /// Message reported on failure
    pub message: String,
    check: RuleCheck,
}

impl BusinessRule {
    /// Create a rule.
    pub fn new(
        id: impl Into<String>,
        field_id: impl Into<String>,
        severity: RuleSeverity,
        message: impl Into<String>,
        check: impl Fn(Option<&str>, &FormDataInstance) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            field_id: field_id.into(),
            severity,
            message: message.into(),
            check: Arc::new(check),
        }
    }

    /// Evaluate the rule against a value and its instance.
    #[must_use]
    pub fn holds(&self, value: Option<&str>, instance: &FormDataInstance) -> bool {
        (self.check)(value, instance)
    }
}

impl fmt::Debug for BusinessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessRule")
            .field("id", &self.id)
            .field("field_id", &self.field_id)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Business rules grouped by form code.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Vec<BusinessRule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for a form.
    pub fn register(&mut self, form_code: impl Into<String>, rule: BusinessRule) {
        self.rules.entry(form_code.into()).or_default().push(rule);
    }

    /// Rules registered for a form, in registration order.
    #[must_use]
    pub fn rules_for(&self, form_code: &str) -> &[BusinessRule] {
        self.rules.get(form_code).map_or(&[], Vec::as_slice)
    }

    /// Total number of rules across forms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register advisory rules from an adjustment map.
    ///
    /// The map lists, per form (`<Map ID="...">`), the cells that take part in
    /// supplementary-declaration adjustments:
    ///
    /// ```xml
    /// <MapMCT>
    ///   <Map ID="01/GTGT">
    ///     <Item CellID="ct37" MCT="37" DieuChinhTang="1" Caption="Increase" />
    ///     <Item CellID="ct38" MCT="38" DieuChinhTang="0" Caption="Decrease" />
    ///   </Map>
    /// </MapMCT>
    /// ```
    ///
    /// Each increase item (`DieuChinhTang="1"`) gets a format rule warning when
    /// the cell holds a negative amount. Returns the number of rules added.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralParseError::Xml`] when the map is not well-formed.
    pub fn load_adjustment_map(&mut self, source: &str) -> Result<usize, StructuralParseError> {
        let Some(root) = read_tree(source)? else {
            return Ok(0);
        };

        let maps = if root.name == xml::MAP {
            vec![&root]
        } else {
            root.descendants_named(xml::MAP)
        };
        let mut added = 0;
        for map in maps {
            let Some(form_code) = map.attr_non_empty(xml::ATTR_MAP_ID) else {
                continue;
            };
            for item in map.children_named(xml::MAP_ITEM) {
                let Some(cell_id) = item.attr_non_empty(xml::ATTR_MAP_CELL_ID) else {
                    continue;
                };
                if item.attr_non_empty(xml::ATTR_MAP_INCREASE) != Some("1") {
                    continue;
                }

                let caption = item.attr_non_empty(xml::ATTR_MAP_CAPTION).unwrap_or(cell_id);
                let code = item.attr_non_empty(xml::ATTR_MAP_CODE).unwrap_or(cell_id);
                self.register(
                    form_code,
                    BusinessRule::new(
                        format!("adjustment-increase-{cell_id}"),
                        cell_id,
                        RuleSeverity::Format,
                        format!(
                            "{caption} (indicator {code}) is an increase adjustment and should \
                             not be negative"
                        ),
                        |value, _| is_not_negative(value),
                    ),
                );
                added += 1;
            }
        }

        tracing::debug!(target: "validation", "Loaded {} adjustment rule(s)", added);
        Ok(added)
    }
}

fn is_not_negative(value: Option<&str>) -> bool {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => Decimal::from_str(raw).map_or(true, |amount| !amount.is_sign_negative()),
        None => true,
    }
}
