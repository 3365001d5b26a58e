use taxform::config::EngineConfig;
use taxform::core::{SchemaWarning, StructuralParseError};
use taxform::model::ControlType;
use taxform::parser::parse_template;
use taxform::test_utils::{fixtures, init_test_logging};

fn field_signature(source: &str) -> Vec<(String, ControlType, String)> {
    let template = parse_template(source, "01/GTGT", &EngineConfig::default()).template.unwrap();
    template.fields().map(|f| (f.id.clone(), f.control_type, f.path.clone())).collect()
}

#[test]
fn test_parse_twice_yields_equal_templates() {
    init_test_logging(None);
    let config = EngineConfig::default();
    let first = parse_template(fixtures::BASIC_TEMPLATE, "01/GTGT", &config);
    let second = parse_template(fixtures::BASIC_TEMPLATE, "01/GTGT", &config);

    assert_eq!(first, second);
    assert_eq!(
        field_signature(fixtures::BASIC_TEMPLATE),
        field_signature(fixtures::BASIC_TEMPLATE)
    );
    assert_eq!(
        field_signature(fixtures::BASIC_TEMPLATE)
            .iter()
            .map(|(id, ..)| id.as_str())
            .collect::<Vec<_>>(),
        vec!["mst", "tinh", "phuong", "ngay_lap", "ct37", "ten", "pl_amount"]
    );
}

#[test]
fn test_unknown_code_9999_resolves_to_text() {
    let source = r#"<Template Version="1">
  <Section>
    <Cells>
      <Cell CellID="a" Path="x/a" Controltype="0"/>
      <Cell CellID="b" Path="x/b" Controltype="9999"/>
    </Cells>
  </Section>
</Template>"#;
    let result = parse_template(source, "X", &EngineConfig::default());

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].to_string().contains("9999"));
    assert_eq!(result.template.unwrap().field("b").unwrap().control_type, ControlType::Text);
}

#[test]
fn test_non_numeric_code_is_also_tolerated() {
    let source = r#"<Template Version="1"><Section><Cells>
      <Cell CellID="a" Path="x/a" Controltype="combo"/>
    </Cells></Section></Template>"#;
    let result = parse_template(source, "X", &EngineConfig::default());
    assert!(result.success);
    assert!(matches!(
        &result.warnings[..],
        [SchemaWarning::UnknownControlType { code, .. }] if code == "combo"
    ));
}

#[test]
fn test_missing_path_is_fatal_and_names_the_field() {
    let result = parse_template(fixtures::MISSING_PATH_TEMPLATE, "X", &EngineConfig::default());

    assert!(!result.success);
    assert!(result.template.is_none());
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        StructuralParseError::MissingAttribute {
            field_id,
            attribute,
            ..
        } => {
            assert_eq!(field_id.as_deref(), Some("ct05"));
            assert_eq!(attribute, "Path");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(result.errors[0].to_string().contains("ct05"));
}

#[test]
fn test_every_broken_field_is_reported_in_order() {
    let source = r#"<Template Version="1">
  <Section id="A"><Cells>
    <Cell CellID="a1" Controltype="0"/>
    <Cell CellID="a2" Path="p/a2" Controltype="0"/>
  </Cells></Section>
  <Section id="B"><Cells>
    <Cell CellID="b1" Path="p/b1"/>
  </Cells></Section>
</Template>"#;
    let result = parse_template(source, "X", &EngineConfig::default());

    let named: Vec<_> = result
        .errors
        .iter()
        .map(|e| match e {
            StructuralParseError::MissingAttribute {
                field_id,
                section,
                ..
            } => (field_id.clone(), section.clone()),
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(
        named,
        vec![(Some("a1".to_string()), "A".to_string()), (Some("b1".to_string()), "B".to_string())]
    );
}

#[test]
fn test_malformed_xml_reports_position() {
    let result = parse_template("<Template><Section></Template>", "X", &EngineConfig::default());
    assert!(!result.success);
    assert!(matches!(result.errors[0], StructuralParseError::Xml { .. }));
}

#[test]
fn test_configured_root_name() {
    let config = EngineConfig::from_toml_str("template_root = \"Sheet\"").unwrap();
    let source = r#"<Sheet Version="1"><Section><Cells><Cell CellID="a" Path="a" Controltype="0"/></Cells></Section></Sheet>"#;
    assert!(parse_template(source, "X", &config).success);
    assert!(!parse_template(fixtures::BASIC_TEMPLATE, "X", &config).success);
}

#[test]
fn test_large_template_parses() {
    let source = fixtures::large_template(500);
    let result = parse_template(&source, "X", &EngineConfig::default());
    assert!(result.success);
    assert_eq!(result.template.unwrap().field_count(), 500);
}

#[test]
fn test_unreadable_attribute_values_are_warned_and_dropped() {
    let source = r#"<Template Version="1">
  <Section id="S1"><Cells>
    <Cell CellID="amount" Path="CTieu/ct01" Controltype="16" MinValue="zero" MaxLen="-3"/>
  </Cells></Section>
  <Section id="S2" Dynamic="1" MaxRows="many" TableName="BK" TablePath="BangKe">
    <RowInfo TemplateRow="x"><Cell CellID="so" Path="so" Controltype="16"/></RowInfo>
  </Section>
</Template>"#;
    let result = parse_template(source, "X", &EngineConfig::default());
    assert!(result.success, "{:?}", result.errors);

    let invalid: Vec<_> = result
        .warnings
        .iter()
        .filter_map(|w| match w {
            SchemaWarning::InvalidAttribute { field_id, attribute, value } => {
                Some((field_id.as_str(), attribute.as_str(), value.as_str()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        invalid,
        vec![
            ("amount", "MaxLen", "-3"),
            ("amount", "MinValue", "zero"),
            ("S2", "MaxRows", "many"),
            ("S2", "TemplateRow", "x"),
        ]
    );

    let template = result.template.unwrap();
    assert_eq!(template.field("amount").unwrap().min_value, None);
    assert_eq!(template.field("amount").unwrap().max_length, None);
    let table = template.section_by_table("BK").unwrap();
    assert_eq!(table.max_rows, 0);
    assert_eq!(table.location.template_row, 0);
}

#[test]
fn test_unknown_elements_are_skipped_with_warning() {
    let source = r#"<Template Version="1">
  <Header/>
  <Section id="S1">
    <Notes>free text</Notes>
    <Cells><Cell CellID="a" Path="x/a" Controltype="0"/><Comment/></Cells>
  </Section>
  <Section id="S2" Dynamic="1" TablePath="BangKe">
    <RowInfo><Cell CellID="r" Path="r" Controltype="0"/></RowInfo>
    <RowInfo><Cell CellID="dup" Path="d" Controltype="0"/></RowInfo>
  </Section>
</Template>"#;
    let result = parse_template(source, "X", &EngineConfig::default());
    assert!(result.success, "{:?}", result.errors);

    let ignored: Vec<_> = result
        .warnings
        .iter()
        .filter_map(|w| match w {
            SchemaWarning::IgnoredElement { element, parent } => {
                Some((element.as_str(), parent.as_str()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        ignored,
        vec![
            ("Header", "Template"),
            ("Notes", "Section"),
            ("Comment", "Cells"),
            ("RowInfo", "Section"),
        ]
    );

    let template = result.template.unwrap();
    assert_eq!(template.field_count(), 2);
    assert!(template.field("dup").is_none());
}
