//! Integration tests for the literalist CLI
//!
//! Every test runs the binary inside a scratch directory so no implicit
//! configuration file from the developer's tree is picked up.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

/// Test helper to get the CLI binary
fn literalist_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("literalist").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

/// Scratch project with one value shared by two modules
fn shared_project() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.py"), "x = 'Shared String'\n").unwrap();
    fs::write(dir.path().join("b.py"), "y = 'Shared String'\n").unwrap();
    dir
}

#[test]
fn test_help_describes_modes() {
    let dir = tempdir().unwrap();
    literalist_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("--apply"));
}

#[test]
fn test_default_mode_previews_without_writing() {
    let dir = shared_project();
    literalist_cmd(&dir)
        .args(["--path", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- PREVIEW: Append to constants.py ---"))
        .stdout(predicate::str::contains("SHARED_STRING = 'Shared String'"))
        .stdout(predicate::str::contains("--- a/a.py"))
        .stdout(predicate::str::contains("+++ b/b.py"));

    assert_eq!(fs::read_to_string(dir.path().join("a.py")).unwrap(), "x = 'Shared String'\n");
    assert!(!dir.path().join("constants.py").exists());
}

#[test]
fn test_apply_rewrites_files() {
    let dir = shared_project();
    literalist_cmd(&dir)
        .args(["--path", ".", "--apply"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Refactored"));

    assert_eq!(
        fs::read_to_string(dir.path().join("b.py")).unwrap(),
        "from constants import SHARED_STRING\ny = SHARED_STRING\n"
    );
    assert!(fs::read_to_string(dir.path().join("constants.py"))
        .unwrap()
        .contains("SHARED_STRING = 'Shared String'"));
}

#[test]
fn test_report_prints_json() {
    let dir = shared_project();
    let output = literalist_cmd(&dir)
        .args(["report", "--path", "."])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entry = &report["SHARED_STRING"];
    assert_eq!(entry["scope"], "global");
    assert_eq!(entry["is_new"], true);
    assert_eq!(entry["value"], "Shared String");
    assert_eq!(entry["occurrences"].as_array().unwrap().len(), 2);
}

#[test]
fn test_report_then_refactor_pipeline() {
    let dir = shared_project();
    let output = literalist_cmd(&dir).arg("report").output().unwrap();
    assert!(output.status.success());

    literalist_cmd(&dir)
        .args(["refactor", "--apply"])
        .write_stdin(output.stdout)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("a.py")).unwrap(),
        "from constants import SHARED_STRING\nx = SHARED_STRING\n"
    );
}

#[test]
fn test_validate_accepts_good_report() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("report.json"),
        r#"{"TOKEN": {"value": "token", "is_new": true, "scope": "local", "source_path": "a.py", "occurrences": []}}"#,
    )
    .unwrap();
    literalist_cmd(&dir)
        .args(["validate", "--report-file", "report.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Valid Report. Contains 1 constants."));
}

#[test]
fn test_validate_lists_schema_errors() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("literalist_report.json"),
        r#"{"A": {"value": 1, "is_new": true, "occurrences": []}, "B": {"value": "x", "is_new": true, "scope": "global", "occurrences": []}}"#,
    )
    .unwrap();
    literalist_cmd(&dir)
        .arg("validate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("  - Constant 'A' missing 'scope'"))
        .stderr(predicate::str::contains("  - Constant 'B' (global) missing 'source_path'"));
}

#[test]
fn test_validate_rejects_missing_and_invalid_files() {
    let dir = tempdir().unwrap();
    literalist_cmd(&dir)
        .args(["validate", "--report-file", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Report file not found"));

    fs::write(dir.path().join("bad.json"), "{not json").unwrap();
    literalist_cmd(&dir)
        .args(["validate", "--report-file", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON syntax."));
}

#[test]
fn test_refactor_rejects_bad_input() {
    let dir = shared_project();
    literalist_cmd(&dir)
        .arg("refactor")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input provided on stdin."));

    literalist_cmd(&dir)
        .arg("refactor")
        .write_stdin("{oops")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON on stdin."));

    literalist_cmd(&dir)
        .arg("refactor")
        .write_stdin(r#"{"X": {"value": 1, "scope": "local", "occurrences": []}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing key 'is_new'"));
}

#[test]
fn test_invalid_thresholds_fail_before_scanning() {
    let dir = shared_project();
    literalist_cmd(&dir)
        .args(["--min-count", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));

    literalist_cmd(&dir)
        .args(["--ignore-num", "abc"])
        .assert()
        .failure();
}

#[test]
fn test_implicit_config_file_is_used() {
    let dir = shared_project();
    fs::write(dir.path().join(".literalist.yml"), "min_count: 3\n").unwrap();
    let output = literalist_cmd(&dir).arg("report").output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report.as_object().unwrap().is_empty());
}

#[test]
fn test_generic_naming_flag() {
    let dir = shared_project();
    literalist_cmd(&dir)
        .args(["report", "--naming", "generic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"CONST_1\""));
}
