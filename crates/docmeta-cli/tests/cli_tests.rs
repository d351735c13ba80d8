//! Integration tests for the docmeta binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Binary with an isolated, empty config
fn docmeta_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docmeta").unwrap();
    cmd.env("DOCMETA_CONFIG", config_dir.path().join("config.yml"))
        .env_remove("DOCMETA_LLM_URL")
        .env_remove("DOCMETA_TABLE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let config_dir = TempDir::new().unwrap();
    docmeta_cmd(&config_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("crossref"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn test_config_path_honors_env() {
    let config_dir = TempDir::new().unwrap();
    docmeta_cmd(&config_dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yml"));
}

#[test]
fn test_config_init_then_show() {
    let config_dir = TempDir::new().unwrap();
    docmeta_cmd(&config_dir)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config_dir.path().join("config.yml").exists());

    docmeta_cmd(&config_dir)
        .env("DOCMETA_LLM_API_KEY", "sk-very-secret")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Universidad de La Habana"))
        .stdout(predicate::str::contains("sk-very-secret").not());
}

#[test]
fn test_extract_missing_file_fails() {
    let config_dir = TempDir::new().unwrap();
    docmeta_cmd(&config_dir)
        .args(["extract", "/nonexistent/paper.pdf", "--backend", "crossref"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_extract_rejects_malformed_doi() {
    let config_dir = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let paper = docs.path().join("paper.md");
    fs::write(&paper, "# On Things\n").unwrap();

    docmeta_cmd(&config_dir)
        .arg("extract")
        .arg(&paper)
        .args(["--doi", "not-a-doi"])
        .assert()
        .code(3);
}

#[test]
fn test_crossref_command_json() {
    let mut server = mockito::Server::new();
    let _work = server
        .mock("GET", "/works/10.1000/182")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"status": "ok", "message": {
                "type": "journal-article",
                "title": ["Handbook of Things"],
                "issued": {"date-parts": [[2018]]},
                "issn-type": [{"type": "print", "value": "1234-5678"}]
            }}"#,
        )
        .create();

    let config_dir = TempDir::new().unwrap();
    let output = docmeta_cmd(&config_dir)
        .env("DOCMETA_CROSSREF_URL", server.url())
        .args(["crossref", "10.1000/182", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let record: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(record["backend"], "crossref");
    assert_eq!(record["title"], "Handbook of Things");
    assert_eq!(record["year"], 2018);
    assert_eq!(record["document_type"], "science_article");
    assert_eq!(record["means_of_dissemination"], "science_magazine");
    assert_eq!(record["serial_type"], serde_json::json!([0]));
    // member lookup fails without a member id
    assert_eq!(record["country_published"], "member id not found");
}

#[test]
fn test_crossref_unknown_doi_exit_code() {
    let mut server = mockito::Server::new();
    let _work = server
        .mock("GET", "/works/10.1000/missing")
        .with_status(404)
        .create();

    let config_dir = TempDir::new().unwrap();
    docmeta_cmd(&config_dir)
        .env("DOCMETA_CROSSREF_URL", server.url())
        .args(["crossref", "10.1000/missing"])
        .assert()
        .code(2);
}

#[test]
fn test_scan_empty_directory() {
    let config_dir = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    docmeta_cmd(&config_dir)
        .arg("scan")
        .arg(docs.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No documents"));
}
