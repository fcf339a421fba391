//! Integration tests for the markup-extractor binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Trail Cycles</title></head>
<body>
<p>Hello world. Good morning.</p>
<code>x = 1</code>
</body>
</html>"#;

fn write_page(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("page.html");
    fs::write(&path, PAGE).unwrap();
    path
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("markup-extractor").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("MARKUP_EXTRACTOR_ANNOTATOR_URL");
    cmd
}

#[test]
fn test_extract_writes_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = write_page(&dir);
    let out = dir.path().join("out");

    cmd()
        .arg("extract")
        .arg(&input)
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocks: 2"))
        .stdout(predicate::str::contains("translatable_structured.json"));

    let document = fs::read_to_string(out.join("non_translatable.html")).unwrap();
    assert!(document.contains("<p>__BLOCK_1_S1__</p>"));
    assert!(document.contains("<code>x = 1</code>"));

    let flat = fs::read_to_string(out.join("translatable_flat.json")).unwrap();
    assert!(flat.contains(r#""BLOCK_1_S2": "Good morning.""#));
    assert!(out.join("translatable_sentences.json").exists());
}

#[test]
fn test_unsupported_language_fails_without_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = write_page(&dir);
    let out = dir.path().join("out");

    cmd()
        .arg("extract")
        .arg(&input)
        .arg("--lang")
        .arg("xx")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("xx"));

    assert!(!out.exists());
}

#[test]
fn test_missing_input_fails() {
    cmd()
        .arg("extract")
        .arg("does-not-exist.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.html"));
}

#[test]
fn test_stats_after_extract() {
    let dir = TempDir::new().unwrap();
    let input = write_page(&dir);

    cmd().arg("-q").arg("extract").arg(&input).assert().success();

    let structured = dir.path().join("translatable_structured.json");
    cmd()
        .arg("stats")
        .arg(&structured)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total words:"))
        .stdout(predicate::str::contains("BLOCK_1"));

    cmd()
        .arg("stats")
        .arg(&structured)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_words\""));
}

#[test]
fn test_config_file_sets_output_names() {
    let dir = TempDir::new().unwrap();
    let input = write_page(&dir);
    let config = dir.path().join("extractor.yaml");
    fs::write(&config, "output:\n  documentFile: skeleton.html\n").unwrap();

    cmd()
        .arg("extract")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(dir.path().join("skeleton.html").exists());
}
