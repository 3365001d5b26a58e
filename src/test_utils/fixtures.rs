//! Template, data and rule-map fixtures shared by unit and integration tests.

use std::fmt::Write as _;

/// A small value-added-tax declaration template.
///
/// One static section with the taxpayer header (tax code, a province/ward
/// cascade, a filing date and one amount) and one dynamic appendix table
/// `PL01` of at most two rows.
pub const BASIC_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Template Version="2.5.4">
  <Section id="S1">
    <Cells>
      <Cell CellID="mst" CellID2="R_mst" Path="TTinChung/NNT/mst" Controltype="12" Required="1" MaxLen="14" HelpContextID="H_MST"/>
      <Cell CellID="tinh" Path="TTinChung/NNT/tinh" Controltype="100" ChildCell="phuong"/>
      <Cell CellID="phuong" Path="TTinChung/NNT/phuong" Controltype="101" ParentCell="tinh"/>
      <Cell CellID="ngay_lap" Path="TTinChung/ngayLapTKhai" Controltype="14"/>
      <Cell CellID="ct37" Path="CTieuTKhaiChinh/ct37" Controltype="16" MinValue="-999999999999"/>
    </Cells>
  </Section>
  <Section id="S2" Dynamic="1" MaxRows="2" TableName="PL01" TablePath="PLuc/PL01">
    <RowInfo TemplateRow="12" ReportRow="30">
      <Cell CellID="ten" Path="ten" Controltype="0" MaxLen="100"/>
      <Cell CellID="pl_amount" Path="sotien" Controltype="16" MinValue="0"/>
    </RowInfo>
  </Section>
</Template>
"#;

/// Form data for [`BASIC_TEMPLATE`] that validates cleanly.
pub const BASIC_DATA: &str = r#"{
  "formCode": "01/GTGT",
  "templateVersion": "2.5.4",
  "values": {
    "TTinChung/NNT/mst": "0123456789",
    "TTinChung/NNT/tinh": "01",
    "TTinChung/NNT/phuong": "00001",
    "TTinChung/ngayLapTKhai": "31/12/2024",
    "CTieuTKhaiChinh/ct37": "-250000"
  },
  "rows": {
    "PL01": [
      { "ten": "Công ty A", "sotien": "1500000" }
    ]
  }
}
"#;

/// Form data for [`BASIC_TEMPLATE`] with a malformed tax code and a ward
/// selected without a province.
pub const INVALID_DATA: &str = r#"{
  "formCode": "01/GTGT",
  "templateVersion": "2.5.4",
  "values": {
    "TTinChung/NNT/mst": "123",
    "TTinChung/NNT/phuong": "00001"
  }
}
"#;

/// Adjustment map flagging `ct37` of `01/GTGT` as an increase adjustment.
pub const ADJUSTMENT_MAP: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MapMCT>
  <Map ID="01/GTGT">
    <Item ID="1" CellID="ct37" MCT="37" DieuChinhTang="1" Caption="Adjusted increase in payable tax"/>
    <Item ID="2" CellID="ct38" MCT="38" DieuChinhTang="0" Caption="Adjusted decrease in payable tax"/>
  </Map>
</MapMCT>
"#;

/// Template whose second cell lacks a `Path`.
pub const MISSING_PATH_TEMPLATE: &str = r#"<Template Version="1.0">
  <Section id="S1">
    <Cells>
      <Cell CellID="ct01" Path="CTieu/ct01" Controltype="0"/>
      <Cell CellID="ct05" Controltype="16"/>
    </Cells>
  </Section>
</Template>
"#;

/// Form catalogue with two forms, grouping entries and a non-form menu.
pub const MENU: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Menus>
  <Menu ID="101" PopID="0" Caption="Declarations">
    <Menu ID="101_1" PopID="101" Caption="VAT"/>
    <Menu ID="01_GTGT" PopID="101" Caption="01/GTGT - To khai thue GTGT" FormName="frm01GTGT"
          VersionXML="2.5.4" TenToKhai="To khai thue gia tri gia tang" MaFile="01_GTGT">
      <Validity>
        <Sheet ID="1" Caption="To khai" SheetName="TK" DataFile="01_GTGT.xml" XMLnode="CTieuTKhaiChinh" MaHoSo="842"/>
        <Sheet ID="2" Caption="Phu luc 01" SheetName="PL01" Active="0" DataFile="01_PL01.xml"/>
      </Validity>
    </Menu>
    <Menu ID="no_caption" PopID="101"/>
    <Menu ID="03_TNDN" PopID="101" Caption="03/TNDN" VersionXML="2.0.1" MaFile="03_TNDN"/>
  </Menu>
  <Menu ID="201" PopID="200" Caption="Utilities"/>
</Menus>
"#;

/// Dropdown pairings: a province and ward on the header, one in a table.
pub const VALID_COMBOBOX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ValidCombobox>
  <Section ID="01_GTGT">
    <Items>
      <Item ID="1" Dynamic="0" SheetIndex="1" CtPath="TTinChung/NNT/tenTinh" CtPathMa="TTinChung/NNT/tinh"/>
      <Item ID="2" Dynamic="0" SheetIndex="1" CtPath="TTinChung/NNT/tenPhuong" CtPathMa="TTinChung/NNT/phuong"/>
    </Items>
  </Section>
  <Section ID="01_PL01">
    <Items>
      <Item ID="3" Dynamic="1" SheetIndex="2" TablePath="PLuc/PL01" CtPath="tenHang" CtPathMa="maHang"/>
    </Items>
  </Section>
  <Section ID="empty"/>
</ValidCombobox>
"#;

/// Static-only template with `fields` text cells, for cache and load tests.
#[must_use]
pub fn large_template(fields: usize) -> String {
    let mut source =
        String::from("<Template Version=\"1.0\">\n  <Section id=\"S1\">\n    <Cells>\n");
    for i in 0..fields {
        let _ = writeln!(
            source,
            "      <Cell CellID=\"f{i}\" Path=\"Data/G{}/f{i}\" Controltype=\"0\" MaxLen=\"50\"/>",
            i / 20
        );
    }
    source.push_str("    </Cells>\n  </Section>\n</Template>\n");
    source
}
