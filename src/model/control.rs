//! Control types
//!
//! The template source identifies a field's UI/validation behaviour with a
//! numeric code. The catalogue is known to be incomplete, so codes resolve
//! through [`ControlType::from_code`] and the parser falls back to
//! [`ControlType::Text`] (with a warning) for anything unrecognised.
//!
//! | code | variant |
//! |-----:|---------|
//! | 0 | [`Text`](ControlType::Text) |
//! | 2 | [`Checkbox`](ControlType::Checkbox) |
//! | 6 | [`DependentDropdown`](ControlType::DependentDropdown) |
//! | 12 | [`TaxCode`](ControlType::TaxCode) |
//! | 14 | [`Date`](ControlType::Date) |
//! | 16 | [`Number`](ControlType::Number) |
//! | 26 | [`Hidden`](ControlType::Hidden) |
//! | 100 | [`ProvinceDropdown`](ControlType::ProvinceDropdown) |
//! | 101 | [`WardDropdown`](ControlType::WardDropdown) |
//! | 102 | [`CountryDropdown`](ControlType::CountryDropdown) |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of control types understood by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlType {
    /// Free text input
    #[default]
    Text,
    /// Boolean checkbox (`0`/`1`)
    Checkbox,
    /// Cascading selection whose options depend on a parent field
    DependentDropdown,
    /// Calendar date
    Date,
    /// Decimal number, optionally bounded
    Number,
    /// Ten-digit taxpayer code with optional `-NNN` branch suffix
    TaxCode,
    /// Province selector (root of the geographic cascade)
    ProvinceDropdown,
    /// Ward selector, depends on a province
    WardDropdown,
    /// Country selector
    CountryDropdown,
    /// Value carried in the document but not shown
    Hidden,
}

impl ControlType {
    /// Every variant, in code order.
    pub const ALL: [Self; 10] = [
        Self::Text,
        Self::Checkbox,
        Self::DependentDropdown,
        Self::TaxCode,
        Self::Date,
        Self::Number,
        Self::Hidden,
        Self::ProvinceDropdown,
        Self::WardDropdown,
        Self::CountryDropdown,
    ];

    /// Resolve a source code to a variant. `None` for codes outside the catalogue.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Text),
            2 => Some(Self::Checkbox),
            6 => Some(Self::DependentDropdown),
            12 => Some(Self::TaxCode),
            14 => Some(Self::Date),
            16 => Some(Self::Number),
            26 => Some(Self::Hidden),
            100 => Some(Self::ProvinceDropdown),
            101 => Some(Self::WardDropdown),
            102 => Some(Self::CountryDropdown),
            _ => None,
        }
    }

    /// Canonical source code for this variant.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Text => 0,
            Self::Checkbox => 2,
            Self::DependentDropdown => 6,
            Self::TaxCode => 12,
            Self::Date => 14,
            Self::Number => 16,
            Self::Hidden => 26,
            Self::ProvinceDropdown => 100,
            Self::WardDropdown => 101,
            Self::CountryDropdown => 102,
        }
    }

    /// Whether a value of this field is only meaningful once a parent field is set.
    #[must_use]
    pub const fn requires_parent(self) -> bool {
        matches!(self, Self::DependentDropdown | Self::WardDropdown)
    }

    /// Whether the control is one of the selection variants.
    #[must_use]
    pub const fn is_dropdown(self) -> bool {
        matches!(
            self,
            Self::DependentDropdown
                | Self::ProvinceDropdown
                | Self::WardDropdown
                | Self::CountryDropdown
        )
    }

    /// Lower-case name used in rendered output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::DependentDropdown => "dependent_dropdown",
            Self::Date => "date",
            Self::Number => "number",
            Self::TaxCode => "tax_code",
            Self::ProvinceDropdown => "province_dropdown",
            Self::WardDropdown => "ward_dropdown",
            Self::CountryDropdown => "country_dropdown",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
