use predicates::prelude::*;
use taxform::test_utils::fixtures;

use crate::common::TestWorkspace;

#[test]
fn test_catalogue_lists_forms() {
    let workspace = TestWorkspace::new();
    workspace.write("Menu.xml", fixtures::MENU);

    workspace
        .taxform()
        .args(["catalogue", "Menu.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 form(s) in Menu.xml"))
        .stdout(predicate::str::contains(
            "01_GTGT 01/GTGT - To khai thue GTGT (v2.5.4, 1 active sheet(s))",
        ))
        .stdout(predicate::str::contains("03_TNDN"))
        .stdout(predicate::str::contains("101_1").not());
}

#[test]
fn test_catalogue_json_with_combos() {
    let workspace = TestWorkspace::new();
    workspace.write("Menu.xml", fixtures::MENU);
    workspace.write("ValidCombobox.xml", fixtures::VALID_COMBOBOX);

    let output = workspace
        .taxform()
        .args(["catalogue", "Menu.xml", "--combos", "ValidCombobox.xml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["forms"][0]["id"], "01_GTGT");
    assert_eq!(json["forms"][0]["sheets"][0]["record_code"], "842");
    assert_eq!(json["combos"].as_array().unwrap().len(), 3);
    assert_eq!(json["combos"][2]["ct_path_ma"], "maHang");
}

#[test]
fn test_catalogue_rejects_malformed_menu() {
    let workspace = TestWorkspace::new();
    workspace.write("Menu.xml", "<Menus><Menu ID=\"1\">");

    workspace
        .taxform()
        .args(["catalogue", "Menu.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid form menu"));
}

#[test]
fn test_catalogue_missing_menu() {
    let workspace = TestWorkspace::new();
    workspace
        .taxform()
        .args(["catalogue", "Menu.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read menu file 'Menu.xml'"));
}
