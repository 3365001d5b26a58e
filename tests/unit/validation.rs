use taxform::config::{EngineConfig, ScoringPolicy};
use taxform::model::{
    ControlType, DynamicSection, Field, FormDataInstance, InstanceStatus, LocationInfo, RowValues,
    Section, Template,
};
use taxform::parser::parse_template;
use taxform::test_utils::fixtures;
use taxform::validation::{
    IssueCategory, RuleRegistry, Severity, ValidationReport, validate, validate_template,
};

fn basic() -> Template {
    parse_template(fixtures::BASIC_TEMPLATE, "01/GTGT", &EngineConfig::default()).template.unwrap()
}

fn run(template: &Template, instance: &FormDataInstance) -> ValidationReport {
    validate(template, instance, &RuleRegistry::new(), &EngineConfig::default())
}

fn with_tax_code(template: &Template, code: &str) -> FormDataInstance {
    let mut instance = FormDataInstance::for_template(template);
    instance.set_value("TTinChung/NNT/mst", code);
    instance
}

#[test]
fn test_basic_template_has_no_defects() {
    let report = validate_template(&basic());
    assert!(report.issues().next().is_none(), "{report:?}");
}

#[test]
fn test_tax_code_ten_digits_passes_three_digits_fails() {
    let template = basic();

    let report = run(&template, &with_tax_code(&template, "0123456789"));
    assert_eq!(report.error_count(), 0);

    let report = run(&template, &with_tax_code(&template, "123"));
    assert_eq!(report.error_count(), 1);
    let issue = report.errors().next().unwrap();
    assert_eq!(issue.category, IssueCategory::Field);
    assert_eq!(issue.field_id.as_deref(), Some("mst"));
}

#[test]
fn test_ward_guard_clears_once_province_is_set() {
    let template = basic();
    let mut instance = with_tax_code(&template, "0123456789");
    instance.set_value("TTinChung/NNT/phuong", "00001");

    let report = run(&template, &instance);
    let structural: Vec<_> =
        report.errors().filter(|i| i.category == IssueCategory::Structural).collect();
    assert_eq!(structural.len(), 1);
    assert_eq!(structural[0].field_id.as_deref(), Some("phuong"));

    instance.set_value("TTinChung/NNT/tinh", "01");
    assert_eq!(run(&template, &instance).error_count(), 0);
}

#[test]
fn test_max_rows_two_with_three_rows() {
    let template = basic();
    let mut instance = with_tax_code(&template, "0123456789");
    for i in 0..3 {
        let mut row = RowValues::new();
        row.insert("ten".to_string(), format!("Row {i}"));
        instance.push_row("PL01", row);
    }
    let report = run(&template, &instance);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.structural_issues.len(), 1);
}

#[test]
fn test_unbounded_section_accepts_fifty_rows() {
    let template = Template::new(
        "1",
        "X",
        vec![Section::dynamic(
            "S1",
            DynamicSection {
                max_rows: 0,
                table_id: "BK".to_string(),
                table_path: "BangKe".to_string(),
                location: LocationInfo {
                    template_row: 5,
                    report_row: 9,
                },
                row_template: vec![Field::new("so", "so", ControlType::Number)],
            },
        )],
    );
    let mut instance = FormDataInstance::for_template(&template);
    for i in 0..50 {
        let mut row = RowValues::new();
        row.insert("so".to_string(), i.to_string());
        instance.push_row("BK", row);
    }
    assert_eq!(run(&template, &instance).error_count(), 0);
}

#[test]
fn test_all_passes_accumulate() {
    let template = basic();
    let mut instance = with_tax_code(&template, "bad");
    instance.set_value("TTinChung/ngayLapTKhai", "32/01/2024");
    instance.set_value("TTinChung/NNT/phuong", "00001");
    let mut row = RowValues::new();
    row.insert("sotien".to_string(), "-1".to_string());
    instance.push_row("PL01", row);

    let mut rules = RuleRegistry::new();
    rules.load_adjustment_map(fixtures::ADJUSTMENT_MAP).unwrap();
    instance.set_value("CTieuTKhaiChinh/ct37", "-10");

    let report = validate(&template, &instance, &rules, &EngineConfig::default());
    // tax code, date, row minimum
    assert_eq!(report.field_issues.len(), 3);
    // advisory adjustment rule
    assert_eq!(report.rule_issues.len(), 1);
    assert_eq!(report.rule_issues[0].severity, Severity::Warning);
    // ward without province
    assert_eq!(report.structural_issues.len(), 1);
    assert_eq!(report.error_count(), 4);
    assert_eq!(report.warning_count(), 1);
    assert!(!report.is_valid());
}

#[test]
fn test_score_is_monotonic_and_floored() {
    let policy = ScoringPolicy::default();
    let template = basic();
    let mut instance = with_tax_code(&template, "0123456789");
    let mut last = run(&template, &instance).score(&policy);
    assert_eq!(last, 100);

    for i in 0..30 {
        instance.set_value(format!("Unknown/p{i}"), "x");
        let score = run(&template, &instance).score(&policy);
        assert!(score <= last);
        last = score;
    }
    assert_eq!(last, 40);

    instance.set_value("TTinChung/NNT/mst", "bad");
    let score = run(&template, &instance).score(&policy);
    assert_eq!(score, 35);

    let harsh = ScoringPolicy {
        error_weight: 50,
        warning_weight: 50,
    };
    assert_eq!(run(&template, &instance).score(&harsh), 0);
}

#[test]
fn test_lifecycle_follows_validation() {
    let template = basic();
    let mut instance = with_tax_code(&template, "123");
    assert_eq!(instance.apply_report(&run(&template, &instance)), InstanceStatus::Draft);

    instance.set_value("TTinChung/NNT/mst", "0123456789");
    assert_eq!(instance.apply_report(&run(&template, &instance)), InstanceStatus::Validated);
    assert!(instance.mark_exported(true));
    assert_eq!(instance.status(), InstanceStatus::Exported);

    instance.set_value("TTinChung/NNT/tinh", "79");
    assert_eq!(instance.status(), InstanceStatus::Draft);
    assert!(!instance.mark_exported(true));
}

fn table_section(section_id: &str, table_id: &str, table_path: &str, cell: &str) -> Section {
    Section::dynamic(
        section_id,
        DynamicSection {
            max_rows: 0,
            table_id: table_id.to_string(),
            table_path: table_path.to_string(),
            location: LocationInfo {
                template_row: 1,
                report_row: 1,
            },
            row_template: vec![Field::new(cell, "so", ControlType::Number)],
        },
    )
}

fn structural_messages(template: &Template) -> Vec<String> {
    validate_template(template)
        .issues()
        .filter(|issue| issue.category == IssueCategory::Structural)
        .map(|issue| issue.message.clone())
        .collect()
}

#[test]
fn test_duplicate_table_path_is_a_defect() {
    let template = Template::new(
        "1",
        "X",
        vec![
            table_section("S1", "BK1", "PLuc/BangKe", "a"),
            table_section("S2", "BK2", "PLuc/BangKe", "b"),
        ],
    );
    let messages = structural_messages(&template);
    assert_eq!(
        messages,
        vec!["dynamic sections 'S1' and 'S2' share table path 'PLuc/BangKe'".to_string()]
    );
    let report = validate_template(&template);
    let issue = report.issues().next().unwrap();
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.path, "PLuc/BangKe");
}

#[test]
fn test_duplicate_table_id_is_a_defect() {
    let template = Template::new(
        "1",
        "X",
        vec![
            table_section("S1", "BK", "PLuc/BangKe1", "a"),
            table_section("S2", "BK", "PLuc/BangKe2", "b"),
        ],
    );
    let messages = structural_messages(&template);
    assert_eq!(messages, vec!["dynamic sections share table id 'BK'".to_string()]);
    assert_eq!(validate_template(&template).error_count(), 1);
}

#[test]
fn test_distinct_tables_have_no_defects() {
    let template = Template::new(
        "1",
        "X",
        vec![
            table_section("S1", "BK1", "PLuc/BangKe1", "a"),
            table_section("S2", "BK2", "PLuc/BangKe2", "b"),
        ],
    );
    assert!(structural_messages(&template).is_empty());
}
