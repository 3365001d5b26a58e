use predicates::prelude::*;

use crate::common::TestWorkspace;

#[test]
fn test_valid_data() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args(["validate", "template.xml", "--form-code", "01/GTGT", "--data", "data.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Form data is valid (0 warning(s), score 100)"));
}

#[test]
fn test_invalid_data_exits_non_zero() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args(["validate", "template.xml", "--form-code", "01/GTGT", "--data", "invalid.json"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("invalid: 2 error(s)"))
        .stderr(predicate::str::contains("'123' is not a valid tax code"))
        .stderr(predicate::str::contains("parent field 'tinh' is empty"));
}

#[test]
fn test_json_report() {
    let workspace = TestWorkspace::with_basic_files();
    let output = workspace
        .taxform()
        .args([
            "validate",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "invalid.json",
            "--format",
            "json",
        ])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["error_count"], 2);
    assert_eq!(json["score"], 90);
    assert_eq!(json["report"]["field_issues"][0]["field_id"], "mst");
    assert_eq!(json["report"]["structural_issues"][0]["field_id"], "phuong");
}

#[test]
fn test_adjustment_rules_are_advisory() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args([
            "validate",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "data.json",
            "--rules",
            "map.xml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid (1 warning(s), score 98)"))
        .stderr(predicate::str::contains("adjustment-increase-ct37"));
}

#[test]
fn test_template_only_validation() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args(["validate", "template.xml", "--form-code", "01/GTGT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Template is valid"));
}

#[test]
fn test_malformed_data_file() {
    let workspace = TestWorkspace::with_basic_files();
    workspace.write("bad.json", "{ \"values\": [1, 2] }");
    workspace
        .taxform()
        .args(["validate", "template.xml", "--form-code", "01/GTGT", "--data", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid form data"));
}

#[test]
fn test_rejected_template_is_reported() {
    let workspace = TestWorkspace::with_basic_files();
    workspace.write("empty.xml", "<Template Version=\"1\"/>");
    workspace
        .taxform()
        .args(["validate", "empty.xml", "--form-code", "X", "--data", "data.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template declares no sections"))
        .stderr(predicate::str::contains("failed to parse with 1 structural error(s)"));
}
