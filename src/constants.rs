//! Global constants used throughout the taxform codebase.
//!
//! Element names, attribute names and policy defaults that are shared by the
//! parser, the exporter and the configuration layer. Keeping them in one place
//! makes the template dialect discoverable without reading the parser.

use std::time::Duration;

/// Default root element of a template source document.
pub const DEFAULT_TEMPLATE_ROOT: &str = "Template";

/// Default root element of an exported declaration document.
pub const DEFAULT_DOCUMENT_ROOT: &str = "HSoThueDTu";

/// Default body element (child of the document root) that field paths are relative to.
pub const DEFAULT_DOCUMENT_BODY: &str = "HSoKhaiThue";

/// Default element name used for one dynamic-section row in an exported document.
pub const DEFAULT_ROW_ELEMENT: &str = "Row";

/// Default body-relative path of the signing date in an exported document.
pub const DEFAULT_SIGNING_DATE_PATH: &str = "TTinChung/TTinTKhaiThue/TKhaiThue/ngayKy";

/// Default body-relative path of the signer name in an exported document.
pub const DEFAULT_SIGNER_PATH: &str = "TTinChung/TTinTKhaiThue/TKhaiThue/nguoiKy";

/// Format the signing date is written in.
pub const SIGNING_DATE_FORMAT: &str = "%d/%m/%Y";

/// Version recorded when a template does not declare one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Score every validation report starts from.
pub const MAX_SCORE: u32 = 100;

/// Default score deduction per error.
pub const DEFAULT_ERROR_WEIGHT: u32 = 5;

/// Default score deduction per warning.
pub const DEFAULT_WARNING_WEIGHT: u32 = 2;

/// Date formats accepted by DATE fields unless configured otherwise.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

/// Prefix of the ordinal id written on every exported row (`ID_1`, `ID_2`, ...).
pub const ROW_ID_PREFIX: &str = "ID_";

/// Environment variable naming an engine configuration file.
pub const CONFIG_ENV_VAR: &str = "TAXFORM_CONFIG";

/// How long a cache follower waits on an in-flight parse before logging a warning
/// and waiting again.
pub const PENDING_PARSE_WARN_AFTER: Duration = Duration::from_secs(10);

/// Template source element and attribute names.
pub mod xml {
    pub const SECTION: &str = "Section";
    pub const CELLS: &str = "Cells";
    pub const ROW_INFO: &str = "RowInfo";
    pub const CELL: &str = "Cell";

    pub const ATTR_VERSION: &str = "Version";

    pub const ATTR_SECTION_ID: &str = "id";
    pub const ATTR_DYNAMIC: &str = "Dynamic";
    pub const ATTR_MAX_ROWS: &str = "MaxRows";
    pub const ATTR_TABLE_NAME: &str = "TableName";
    pub const ATTR_TABLE_PATH: &str = "TablePath";
    pub const ATTR_TEMPLATE_ROW: &str = "TemplateRow";
    pub const ATTR_REPORT_ROW: &str = "ReportRow";

    pub const ATTR_CELL_ID: &str = "CellID";
    pub const ATTR_CELL_ID2: &str = "CellID2";
    pub const ATTR_PATH: &str = "Path";
    pub const ATTR_CONTROL_TYPE: &str = "Controltype";
    pub const ATTR_ENCODE: &str = "Encode";
    pub const ATTR_VALUE: &str = "Value";
    pub const ATTR_DEFAULT_VALUE: &str = "DefaultValue";
    pub const ATTR_MAX_LEN: &str = "MaxLen";
    pub const ATTR_MIN_VALUE: &str = "MinValue";
    pub const ATTR_MAX_VALUE: &str = "MaxValue";
    pub const ATTR_HELP: &str = "HelpContextID";
    pub const ATTR_PARENT: &str = "ParentCell";
    pub const ATTR_CHILD: &str = "ChildCell";
    pub const ATTR_SELECTED_VALUE: &str = "SelectedValue";
    pub const ATTR_REQUIRED: &str = "Required";

    /// Exported document attributes.
    pub const ATTR_FORM_CODE: &str = "formCode";
    pub const ATTR_TEMPLATE_VERSION: &str = "templateVersion";
    pub const ATTR_ROW_ID: &str = "id";
    pub const ATTR_ROW_TEMPLATE: &str = "templateRow";
    pub const ATTR_ROW_REPORT: &str = "reportRow";

    /// Adjustment map elements and attributes.
    pub const MAP: &str = "Map";
    pub const MAP_ITEM: &str = "Item";
    pub const ATTR_MAP_ID: &str = "ID";
    pub const ATTR_MAP_CELL_ID: &str = "CellID";
    pub const ATTR_MAP_CODE: &str = "MCT";
    pub const ATTR_MAP_INCREASE: &str = "DieuChinhTang";
    pub const ATTR_MAP_CAPTION: &str = "Caption";

    /// Form catalogue (`Menu.xml`) elements and attributes.
    pub const MENU: &str = "Menu";
    pub const ATTR_MENU_POP_ID: &str = "PopID";
    pub const MENU_FORMS_POP_ID: &str = "101";
    pub const ATTR_MENU_ID: &str = "ID";
    pub const ATTR_MENU_CAPTION: &str = "Caption";
    pub const ATTR_MENU_FORM_NAME: &str = "FormName";
    pub const ATTR_MENU_VERSION: &str = "VersionXML";
    pub const ATTR_MENU_DESCRIPTION: &str = "TenToKhai";
    pub const ATTR_MENU_DETAIL: &str = "MoTaBieuMau";
    pub const ATTR_MENU_FILE_CODE: &str = "MaFile";
    pub const VALIDITY: &str = "Validity";
    pub const SHEET: &str = "Sheet";
    pub const ATTR_SHEET_ID: &str = "ID";
    pub const ATTR_SHEET_CAPTION: &str = "Caption";
    pub const ATTR_SHEET_NAME: &str = "SheetName";
    pub const ATTR_SHEET_ACTIVE: &str = "Active";
    pub const ATTR_SHEET_DATA_FILE: &str = "DataFile";
    pub const ATTR_SHEET_XML_NODE: &str = "XMLnode";
    pub const ATTR_SHEET_RECORD_CODE: &str = "MaHoSo";

    /// Dropdown rule (`ValidCombobox.xml`) elements and attributes.
    pub const COMBO_ITEMS: &str = "Items";
    pub const COMBO_ITEM: &str = "Item";
    pub const ATTR_COMBO_ID: &str = "ID";
    pub const ATTR_COMBO_DYNAMIC: &str = "Dynamic";
    pub const ATTR_COMBO_SHEET_INDEX: &str = "SheetIndex";
    pub const ATTR_COMBO_TABLE_PATH: &str = "TablePath";
    pub const ATTR_COMBO_PATH: &str = "CtPath";
    pub const ATTR_COMBO_CODE_PATH: &str = "CtPathMa";
}
