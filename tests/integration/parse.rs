use predicates::prelude::*;
use taxform::test_utils::fixtures;

use crate::common::TestWorkspace;

#[test]
fn test_parse_reports_structure() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args(["parse", "template.xml", "--form-code", "01/GTGT"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Parsed 01/GTGT v2.5.4: 2 section(s), 1 dynamic, 7 field(s)",
        ));
}

#[test]
fn test_parse_json_output() {
    let workspace = TestWorkspace::with_basic_files();
    let output = workspace
        .taxform()
        .args(["parse", "template.xml", "--form-code", "01/GTGT", "--check", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["version"], "2.5.4");
    assert_eq!(json["fields"], 7);
    assert_eq!(json["errors"].as_array().unwrap().len(), 0);
    assert!(json["defects"]["structural_issues"].as_array().unwrap().is_empty());
}

#[test]
fn test_parse_failure_lists_every_error() {
    let workspace = TestWorkspace::new();
    workspace.write("broken.xml", fixtures::MISSING_PATH_TEMPLATE);
    workspace
        .taxform()
        .args(["parse", "broken.xml", "--form-code", "X"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "field 'ct05' in section 'S1' is missing required attribute Path",
        ));
}

#[test]
fn test_unknown_control_type_is_a_warning() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "odd.xml",
        r#"<Template Version="1"><Section><Cells><Cell CellID="a" Path="x/a" Controltype="9999"/></Cells></Section></Template>"#,
    );
    workspace
        .taxform()
        .args(["parse", "odd.xml", "--form-code", "X"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown control type 9999"));
}

#[test]
fn test_check_flags_template_defects() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "defect.xml",
        r#"<Template Version="1"><Section><Cells>
  <Cell CellID="n" Path="x/n" Controltype="16" MinValue="10" MaxValue="1"/>
</Cells></Section></Template>"#,
    );
    workspace
        .taxform()
        .args(["parse", "defect.xml", "--form-code", "X"])
        .assert()
        .success();
    workspace
        .taxform()
        .args(["parse", "defect.xml", "--form-code", "X", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MinValue 10 greater than MaxValue 1"));
}

#[test]
fn test_missing_template_file() {
    let workspace = TestWorkspace::new();
    workspace
        .taxform()
        .args(["parse", "nope.xml", "--form-code", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.xml"));
}
