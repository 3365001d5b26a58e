use predicates::prelude::*;
use taxform::config::EngineConfig;
use taxform::parser::{parse_template, read_document};
use taxform::test_utils::fixtures;

use crate::common::TestWorkspace;

#[test]
fn test_export_to_file_round_trips() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args([
            "export",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "data.json",
            "-o",
            "out.xml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"))
        .stdout(predicate::str::contains("Exported"));

    let document = workspace.read("out.xml");
    let config = EngineConfig::default();
    let template = parse_template(fixtures::BASIC_TEMPLATE, "01/GTGT", &config).template.unwrap();
    let recovered = read_document(&document, &template, &config).unwrap();
    assert_eq!(recovered.values["TTinChung/NNT/mst"], "0123456789");
    assert_eq!(recovered.values["CTieuTKhaiChinh/ct37"], "-250000");
    assert_eq!(recovered.rows["PL01"][0].values["ten"], "Công ty A");
}

#[test]
fn test_export_to_stdout() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args(["export", "template.xml", "--form-code", "01/GTGT", "--data", "data.json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"))
        .stdout(predicate::str::contains("<Row id=\"ID_1\" templateRow=\"12\" reportRow=\"30\">"));
}

#[test]
fn test_invalid_data_still_exports_unless_required() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args([
            "export",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "invalid.json",
            "-o",
            "draft.xml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Draft"));
    assert!(workspace.file("draft.xml").exists());

    workspace
        .taxform()
        .args([
            "export",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "invalid.json",
            "--require-valid",
            "-o",
            "refused.xml",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to export"));
    assert!(!workspace.file("refused.xml").exists());
}

#[test]
fn test_export_json_summary() {
    let workspace = TestWorkspace::with_basic_files();
    let output = workspace
        .taxform()
        .args([
            "export",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "data.json",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["compliance_ok"], true);
    assert_eq!(json["status"], "exported");
    assert!(json["document"].as_str().unwrap().contains("<HSoKhaiThue"));
}

#[test]
fn test_unplaceable_data_is_warned() {
    let workspace = TestWorkspace::with_basic_files();
    workspace.write(
        "extra.json",
        r#"{ "values": { "TTinChung/NNT/mst": "0123456789", "Ghost/path": "1" } }"#,
    );
    workspace
        .taxform()
        .args([
            "export",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "extra.json",
            "-o",
            "out.xml",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Ghost/path"));
}

#[test]
fn test_unwritable_output_reports_path() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args([
            "export",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "data.json",
            "-o",
            "missing/out.xml",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to write document 'missing/out.xml'"))
        .stderr(predicate::str::contains("Check that the path exists"));
}

#[test]
fn test_signed_data_exports_signing_metadata() {
    let workspace = TestWorkspace::with_basic_files();
    let signature = r#""signature": { "signer": "Nguyen Van A", "date": "2024-12-31" },"#;
    let signed =
        fixtures::BASIC_DATA.replacen("\"formCode\"", &format!("{signature}\n  \"formCode\""), 1);
    workspace.write("signed.json", &signed);

    workspace
        .taxform()
        .args(["export", "template.xml", "--form-code", "01/GTGT", "--data", "signed.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<ngayKy>31/12/2024</ngayKy>"))
        .stdout(predicate::str::contains("<nguoiKy>Nguyen Van A</nguoiKy>"));
}
