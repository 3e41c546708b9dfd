//! Integration tests for the qms binary.
#![cfg(all(feature = "cli", feature = "sqlite"))]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn qms() -> Command {
    Command::cargo_bin("qms").unwrap()
}

/// Writes a config whose database and storage live inside `dir`.
fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("qms.toml");
    let content = format!(
        "[general]\nlog_level = \"warn\"\n\n[backend]\ndb_path = {:?}\nstorage_dir = {:?}\n",
        dir.join("qms.db").display().to_string(),
        dir.join("storage").display().to_string(),
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn write_rows(dir: &Path) -> PathBuf {
    let path = dir.join("rows.json");
    std::fs::write(
        &path,
        r#"[
            {"sheet_id": "P-01", "section": "A", "chapter": "A1", "item_code": "A1.1-M2-01", "achieved_level": "Mức 2", "passed": true, "evaluated_by": "Lan"},
            {"sheet_id": "P-01", "section": "B", "chapter": "B2", "item_code": "B2.1-M4-01", "achieved_level": "Mức 4"},
            {"section": "C", "chapter": "C1", "item_code": "C1.1", "achieved_level": "Mức 5"}
        ]"#,
    )
    .unwrap();
    path
}

#[test]
fn test_version() {
    qms()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("qms"));
}

#[test]
fn test_help() {
    qms()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("delete-sheet"));
}

#[test]
fn test_unknown_command_fails() {
    qms().arg("frobnicate").assert().failure();
}

#[test]
fn test_init_writes_config() {
    let dir = TempDir::new().unwrap();

    qms()
        .arg("init")
        .arg("--path")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));

    let content = std::fs::read_to_string(dir.path().join("qms.toml")).unwrap();
    assert!(content.contains("[general]"));
    assert!(content.contains("[backend]"));
    assert!(content.contains("[cache]"));
}

#[test]
fn test_import_summary_and_delete() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let rows = write_rows(dir.path());

    qms()
        .arg("--config")
        .arg(&config)
        .arg("import")
        .arg(&rows)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 evaluation rows"))
        .stdout(predicate::str::contains("1 rows have no sheet id"));

    qms()
        .arg("--config")
        .arg(&config)
        .args(["summary", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sheet_id\": \"P-01\""))
        .stdout(predicate::str::contains("\"score\": 3.0"));

    qms()
        .arg("--config")
        .arg(&config)
        .args(["sheet", "P-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mức 4"));

    qms()
        .arg("--config")
        .arg(&config)
        .args(["delete-sheet", "P-01", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 rows"));

    qms()
        .arg("--config")
        .arg(&config)
        .args(["sheet", "P-01"])
        .assert()
        .failure();
}

#[test]
fn test_unreadable_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("qms.toml");
    std::fs::write(&config, "[backend\ndb_path = 42\n").unwrap();

    qms()
        .arg("--config")
        .arg(&config)
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config"))
        .stderr(predicate::str::contains("qms.toml"));
}

#[test]
fn test_import_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    qms()
        .arg("--config")
        .arg(&config)
        .arg("import")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure();
}
