use taxform::config::EngineConfig;
use taxform::core::ComplianceErrorKind;
use taxform::export::export_document;
use taxform::model::{FormDataInstance, Template};
use taxform::parser::{parse_template, read_document};
use taxform::test_utils::fixtures;
use taxform::validation::{RuleRegistry, validate};

fn basic() -> Template {
    parse_template(fixtures::BASIC_TEMPLATE, "01/GTGT", &EngineConfig::default()).template.unwrap()
}

fn sample_data() -> FormDataInstance {
    serde_json::from_str(fixtures::BASIC_DATA).unwrap()
}

#[test]
fn test_round_trip_recovers_every_value() {
    let template = basic();
    let config = EngineConfig::default();
    let instance = sample_data();
    assert!(validate(&template, &instance, &RuleRegistry::new(), &config).is_valid());

    let result = export_document(&template, &instance, &config).unwrap();
    assert!(result.compliance_ok, "{:?}", result.errors);

    let recovered = read_document(&result.document, &template, &config).unwrap();
    for (path, value) in instance.values() {
        assert_eq!(recovered.values.get(path), Some(value), "{path}");
    }
    let rows = &recovered.rows["PL01"];
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values["ten"], "Công ty A");
    assert_eq!(rows[0].values["sotien"], "1500000");
    assert_eq!((rows[0].template_row, rows[0].report_row), (Some(12), Some(30)));

    let restored = recovered.into_instance(&template);
    assert_eq!(restored.values(), instance.values());
    assert_eq!(restored.rows("PL01"), instance.rows("PL01"));
}

#[test]
fn test_configured_document_shape() {
    let config = EngineConfig::from_toml_str(
        r#"
[document]
root = "Declaration"
body = "Body"
row_element = "Line"
"#,
    )
    .unwrap();
    let template = basic();
    let result = export_document(&template, &sample_data(), &config).unwrap();

    assert!(result.compliance_ok, "{:?}", result.errors);
    assert!(result.document.contains("<Declaration>"));
    assert!(result.document.contains("<Body formCode=\"01/GTGT\" templateVersion=\"2.5.4\">"));
    assert!(result.document.contains("<Line id=\"ID_1\" templateRow=\"12\" reportRow=\"30\">"));
}

#[test]
fn test_values_are_escaped() {
    let template = basic();
    let mut instance = sample_data();
    instance.set_row_value("PL01", 0, "ten", "A & B <Co> \"Ltd\"");

    let result = export_document(&template, &instance, &EngineConfig::default()).unwrap();
    assert!(result.compliance_ok, "{:?}", result.errors);
    assert!(result.document.contains("A &amp; B &lt;Co&gt;"));
}

#[test]
fn test_document_is_returned_even_when_not_compliant() {
    let template = Template::new(
        "1",
        "X",
        vec![taxform::model::Section::fixed(
            "S1",
            vec![
                taxform::model::Field::new("a", "A", taxform::model::ControlType::Text),
                taxform::model::Field::new("b", "A/b", taxform::model::ControlType::Text),
            ],
        )],
    );
    let mut instance = FormDataInstance::for_template(&template);
    instance.set_value("A", "parent");
    instance.set_value("A/b", "child");

    let result = export_document(&template, &instance, &EngineConfig::default()).unwrap();
    assert!(!result.compliance_ok);
    assert!(!result.document.is_empty());
    assert!(result.document.contains("child"));
    assert!(result.errors.iter().all(|e| e.kind == ComplianceErrorKind::Mismatch));
}
