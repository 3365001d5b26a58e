use predicates::prelude::*;

use crate::common::TestWorkspace;

#[test]
fn test_config_file_changes_document_shape() {
    let workspace = TestWorkspace::with_basic_files();
    workspace.write("taxform.toml", "[document]\nrow_element = \"Dong\"\n");
    workspace
        .taxform()
        .args([
            "--config",
            "taxform.toml",
            "export",
            "template.xml",
            "--form-code",
            "01/GTGT",
            "--data",
            "data.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("<Dong id=\"ID_1\""));
}

#[test]
fn test_config_from_environment() {
    let workspace = TestWorkspace::with_basic_files();
    let config = workspace.write("strict.toml", "[validation]\nstrict_unknown_paths = true\n");
    workspace.write(
        "extra.json",
        r#"{ "values": { "TTinChung/NNT/mst": "0123456789", "Ghost/path": "1" } }"#,
    );

    workspace
        .taxform()
        .args(["validate", "template.xml", "--form-code", "01/GTGT", "--data", "extra.json"])
        .assert()
        .success();
    workspace
        .taxform()
        .env("TAXFORM_CONFIG", &config)
        .args(["validate", "template.xml", "--form-code", "01/GTGT", "--data", "extra.json"])
        .assert()
        .failure();
}

#[test]
fn test_missing_config_file() {
    let workspace = TestWorkspace::with_basic_files();
    workspace
        .taxform()
        .args(["-c", "absent.toml", "parse", "template.xml", "--form-code", "01/GTGT"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("--config"));
}

#[test]
fn test_invalid_config_value() {
    let workspace = TestWorkspace::with_basic_files();
    workspace.write("bad.toml", "date_formats = []\n");
    workspace
        .taxform()
        .args(["-c", "bad.toml", "parse", "template.xml", "--form-code", "01/GTGT"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("date_formats must list at least one format"));
}
