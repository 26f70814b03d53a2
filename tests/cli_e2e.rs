//! End-to-end CLI tests for the exam-reports binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Builds a command isolated from the user's config file.
fn cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("exam-reports").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home).env_remove("RUST_LOG");
    cmd
}

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"%PDF-1.4").unwrap();
}

#[test]
fn test_binary_help_displays_usage() {
    let temp = TempDir::new().unwrap();
    cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download, convert and browse"));
}

#[test]
fn test_binary_version_displays_version() {
    let temp = TempDir::new().unwrap();
    cmd(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("exam-reports"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let temp = TempDir::new().unwrap();
    cmd(temp.path()).assert().failure();
}

#[test]
fn test_list_empty_library() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("library");
    cmd(temp.path())
        .args(["list", "--upload-dir"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("No reports found"));
    assert!(root.join("converted").is_dir());
}

#[test]
fn test_list_json_filters_by_subject() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("library");
    touch(&root.join("Chemistry/Chemistry_2023_exam1.pdf"));
    touch(&root.join("Physics/Physics_2022_exam2.pdf"));

    let output = cmd(temp.path())
        .args(["-q", "list", "--json", "--subject", "Chemistry", "--upload-dir"])
        .arg(&root)
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["subject"], "Chemistry");
    assert_eq!(entries[0]["year"], "2023");
    assert_eq!(entries[0]["exam_number"], "exam1");
}

#[test]
fn test_import_edit_delete_round() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("library");
    let incoming = temp.path().join("incoming/chem_examreport_2021_2.pdf");
    touch(&incoming);

    cmd(temp.path())
        .args(["-q", "import", "--no-convert", "--upload-dir"])
        .arg(&root)
        .arg(&incoming)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported"));
    let imported = root.join("Chemistry/chem_examreport_2021_2.pdf");
    assert!(imported.is_file());

    cmd(temp.path())
        .args(["-q", "edit", "--year", "2020", "--upload-dir"])
        .arg(&root)
        .arg(&imported)
        .assert()
        .success();
    let renamed = root.join("Chemistry/Chemistry_2020_exam2.pdf");
    assert!(renamed.is_file());
    assert!(!imported.exists());

    cmd(temp.path())
        .args(["-q", "delete", "--upload-dir"])
        .arg(&root)
        .arg(&renamed)
        .assert()
        .success();
    assert!(!renamed.exists());
}

#[test]
fn test_delete_unknown_path_fails() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("library");
    cmd(temp.path())
        .args(["-q", "delete", "--upload-dir"])
        .arg(&root)
        .arg(root.join("Chemistry/missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No report at"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("exam-reports");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "bogus_key = 1\n").unwrap();

    cmd(temp.path())
        .args(["list", "--upload-dir"])
        .arg(temp.path().join("library"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}
