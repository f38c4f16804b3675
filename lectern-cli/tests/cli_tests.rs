//! Integration tests for the Lectern CLI
//!
//! Everything here runs without a live API: the local store lives in a temp
//! directory and network commands point at a closed port.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// An address nothing listens on
const DEAD_API: &str = "http://127.0.0.1:9/api/v1";

fn lectern(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lectern").unwrap();
    cmd.env_remove("LECTERN_API_URL")
        .env_remove("LECTERN_VIEWER_PROXY")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--api-url")
        .arg(DEAD_API);
    cmd
}

/// Write a reading history straight into the store file
fn seed_history(dir: &TempDir, entries: serde_json::Value) {
    let store = serde_json::json!({ "read_history": entries.to_string() });
    fs::write(dir.path().join("local_store.json"), store.to_string())
        .expect("Failed to write store file");
}

fn entry(id: i64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "author": "Someone",
        "thumbnail": "https://placehold.co/100",
        "category": "General",
        "viewedAt": "2024-03-05T10:00:00Z"
    })
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("lectern").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("home"))
        .stdout(predicate::str::contains("view"))
        .stdout(predicate::str::contains("favorite"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("preview"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("lectern").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lectern"));
}

#[test]
fn test_history_help() {
    let mut cmd = Command::cargo_bin("lectern").unwrap();
    cmd.args(["history", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("clear"));
}

#[test]
fn test_empty_history() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No reading history yet"));

    lectern(&dir)
        .args(["history", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_history_list_remove_clear() {
    let dir = TempDir::new().unwrap();
    seed_history(
        &dir,
        serde_json::json!([entry(2, "Dune"), entry(1, "Emma")]),
    );

    lectern(&dir)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dune"))
        .stdout(predicate::str::contains("Emma"))
        .stdout(predicate::str::contains("Mar 5, 2024"));

    lectern(&dir)
        .args(["history", "remove", "2"])
        .assert()
        .success();

    let output = lectern(&dir)
        .args(["history", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], 1);

    lectern(&dir).args(["history", "clear"]).assert().success();
    lectern(&dir)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No reading history yet"));
}

#[test]
fn test_malformed_history_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = serde_json::json!({ "read_history": "not json" });
    fs::write(dir.path().join("local_store.json"), store.to_string()).unwrap();

    lectern(&dir)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No reading history yet"));
}

#[test]
fn test_login_and_logout() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["login", "--token", "abc", "--name", "Ada", "--role", "teacher"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as Ada"));

    let store = fs::read_to_string(dir.path().join("local_store.json")).unwrap();
    assert!(store.contains("access_token"));

    lectern(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));

    let store = fs::read_to_string(dir.path().join("local_store.json")).unwrap();
    assert!(!store.contains("access_token"));
}

#[test]
fn test_login_rejects_unknown_role() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["login", "--token", "abc", "--role", "janitor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a known role"));
}

#[test]
fn test_favorite_requires_sign_in() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["favorite", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please sign in"))
        .stderr(predicate::str::contains("pages/signin.html"));
}

#[test]
fn test_preview_pdf_uses_secure_viewer_url() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["preview", "http://cdn.test/books/dune.pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://docs.google.com/gview?url=https%3A%2F%2Fcdn.test%2Fbooks%2Fdune.pdf&embedded=true",
        ))
        .stdout(predicate::str::contains("Download:    https://cdn.test/books/dune.pdf"));
}

#[test]
fn test_preview_non_pdf_is_unsupported() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["preview", "https://cdn.test/books/dune.epub"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preview unsupported"))
        .stdout(predicate::str::contains("dune.epub"));
}

#[test]
fn test_view_unreachable_api_reports_not_found() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["view", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Book 5 not found"));

    lectern(&dir)
        .args(["history", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_search_rejects_blank_query() {
    let dir = TempDir::new().unwrap();
    lectern(&dir)
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}
