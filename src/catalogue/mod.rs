//! Form catalogue and dropdown pairings.
//!
//! A template set ships a `Menu.xml` listing the declarations it offers. Each
//! form is a `<Menu PopID="101">` entry whose `<Validity>` lists the sheets
//! (main declaration plus appendices) the form consists of:
//!
//! ```xml
//! <Menu ID="01_GTGT" PopID="101" Caption="01/GTGT" VersionXML="2.5.4" MaFile="01_GTGT">
//!   <Validity>
//!     <Sheet ID="1" Caption="To khai" SheetName="TK" DataFile="01_GTGT.xml" MaHoSo="842"/>
//!     <Sheet ID="2" Caption="Phu luc" SheetName="PL01" Active="0"/>
//!   </Validity>
//! </Menu>
//! ```
//!
//! `ValidCombobox.xml` pairs the display cell of a dropdown (`CtPath`) with
//! the cell that stores the selected code (`CtPathMa`). Those pairs describe
//! how one picker fills two cells; they are not parent/child cascades and the
//! resolver does not turn them into dependency edges.

use serde::Serialize;

use crate::constants::xml;
use crate::core::StructuralParseError;
use crate::parser::xml::{XmlNode, read_tree};

/// Menu entries that group forms rather than name one.
const GROUPING_ENTRIES: [&str; 2] = ["101", "101_1"];

/// Forms offered by a template set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormCatalogue {
    /// Forms in menu order
    pub forms: Vec<FormEntry>,
}

impl FormCatalogue {
    /// Form by menu id.
    #[must_use]
    pub fn form(&self, id: &str) -> Option<&FormEntry> {
        self.forms.iter().find(|form| form.id == id)
    }

    /// Number of forms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Whether the catalogue lists no forms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

/// One declaration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormEntry {
    /// Menu id (`ID`)
    pub id: String,
    /// Display caption
    pub caption: String,
    /// Internal form name (`FormName`)
    pub form_name: String,
    /// Template version the form is exported with (`VersionXML`)
    pub version: String,
    /// Official title (`TenToKhai`)
    pub description: String,
    /// Longer description (`MoTaBieuMau`)
    pub detail_description: String,
    /// File code used for template sources (`MaFile`)
    pub file_code: String,
    /// Sheets in declaration order
    pub sheets: Vec<SheetEntry>,
}

impl FormEntry {
    /// Sheets currently in use.
    pub fn active_sheets(&self) -> impl Iterator<Item = &SheetEntry> {
        self.sheets.iter().filter(|sheet| sheet.active)
    }
}

/// One sheet of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetEntry {
    /// Sheet id
    pub id: String,
    /// Display caption
    pub caption: String,
    /// Sheet name in the template source
    pub sheet_name: String,
    /// `Active` attribute, on unless set to something other than `1`
    pub active: bool,
    /// Data file holding the sheet's template
    pub data_file: String,
    /// Document node the sheet is exported under
    pub xml_node: String,
    /// Record code (`MaHoSo`)
    pub record_code: String,
}

/// A dropdown whose selection fills a display cell and a code cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboRule {
    /// Rule id
    pub id: String,
    /// Whether the cells sit in a dynamic table
    pub dynamic: bool,
    /// Sheet the cells belong to
    pub sheet_index: String,
    /// Table the cells belong to, for dynamic sheets
    pub table_path: String,
    /// Path of the cell showing the selected caption
    pub ct_path: String,
    /// Path of the cell storing the selected code
    pub ct_path_ma: String,
}

/// Read a `Menu.xml` form catalogue.
///
/// Entries without an id or caption are skipped, as are the grouping entries
/// `101` and `101_1`. An empty document yields an empty catalogue.
///
/// # Errors
///
/// Returns [`StructuralParseError::Xml`] when the menu is not well-formed.
pub fn read_menu(source: &str) -> Result<FormCatalogue, StructuralParseError> {
    let Some(root) = read_tree(source)? else {
        return Ok(FormCatalogue::default());
    };

    let menus = if root.name == xml::MENU {
        vec![&root]
    } else {
        root.descendants_named(xml::MENU)
    };
    let forms: Vec<_> = menus
        .into_iter()
        .filter(|menu| menu.attr(xml::ATTR_MENU_POP_ID) == Some(xml::MENU_FORMS_POP_ID))
        .filter_map(form_entry)
        .collect();

    tracing::debug!(target: "catalogue", "Read {} form(s) from menu", forms.len());
    Ok(FormCatalogue {
        forms,
    })
}

fn form_entry(menu: &XmlNode) -> Option<FormEntry> {
    let id = menu.attr_non_empty(xml::ATTR_MENU_ID)?;
    let caption = menu.attr_non_empty(xml::ATTR_MENU_CAPTION)?;
    if GROUPING_ENTRIES.contains(&id) {
        return None;
    }

    let text = |name: &str| menu.attr(name).unwrap_or_default().to_string();
    let sheets = menu
        .child(xml::VALIDITY)
        .map(|validity| validity.children_named(xml::SHEET).map(sheet_entry).collect())
        .unwrap_or_default();

    Some(FormEntry {
        id: id.to_string(),
        caption: caption.to_string(),
        form_name: text(xml::ATTR_MENU_FORM_NAME),
        version: text(xml::ATTR_MENU_VERSION),
        description: text(xml::ATTR_MENU_DESCRIPTION),
        detail_description: text(xml::ATTR_MENU_DETAIL),
        file_code: text(xml::ATTR_MENU_FILE_CODE),
        sheets,
    })
}

fn sheet_entry(sheet: &XmlNode) -> SheetEntry {
    let text = |name: &str| sheet.attr(name).unwrap_or_default().to_string();
    SheetEntry {
        id: text(xml::ATTR_SHEET_ID),
        caption: text(xml::ATTR_SHEET_CAPTION),
        sheet_name: text(xml::ATTR_SHEET_NAME),
        active: sheet.attr(xml::ATTR_SHEET_ACTIVE).unwrap_or("1") == "1",
        data_file: text(xml::ATTR_SHEET_DATA_FILE),
        xml_node: text(xml::ATTR_SHEET_XML_NODE),
        record_code: text(xml::ATTR_SHEET_RECORD_CODE),
    }
}

/// Read the dropdown pairings of a `ValidCombobox.xml`.
///
/// Items are collected from every `<Section><Items>` in document order.
///
/// # Errors
///
/// Returns [`StructuralParseError::Xml`] when the document is not well-formed.
pub fn read_combo_rules(source: &str) -> Result<Vec<ComboRule>, StructuralParseError> {
    let Some(root) = read_tree(source)? else {
        return Ok(Vec::new());
    };

    let mut rules = Vec::new();
    for section in root.children_named(xml::SECTION) {
        let Some(items) = section.child(xml::COMBO_ITEMS) else {
            continue;
        };
        for item in items.children_named(xml::COMBO_ITEM) {
            let text = |name: &str| item.attr(name).unwrap_or_default().to_string();
            rules.push(ComboRule {
                id: text(xml::ATTR_COMBO_ID),
                dynamic: item.attr(xml::ATTR_COMBO_DYNAMIC) == Some("1"),
                sheet_index: text(xml::ATTR_COMBO_SHEET_INDEX),
                table_path: text(xml::ATTR_COMBO_TABLE_PATH),
                ct_path: text(xml::ATTR_COMBO_PATH),
                ct_path_ma: text(xml::ATTR_COMBO_CODE_PATH),
            });
        }
    }

    tracing::debug!(target: "catalogue", "Read {} dropdown pairing(s)", rules.len());
    Ok(rules)
}
