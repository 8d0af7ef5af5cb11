//! CLI integration tests
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("addventure")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn write_dump(tmp: &TempDir) -> String {
    let dump = json!([
        {"id": 3, "parent_id": 1, "title": "Test title 3", "author": "author 1", "author_email": null,
         "posted": null, "tags": ["waff", "lime"], "thread": null},
        {"id": 1, "parent_id": null, "title": "Test title 1", "author": "author 1", "author_email": null,
         "posted": null, "tags": [], "thread": null},
        {"id": 4, "parent_id": 2, "title": "Test title 4", "author": "author 3", "author_email": null,
         "posted": null, "tags": ["dark"], "thread": "Well, that got dark quickly"},
        {"id": 2, "parent_id": 1, "title": "Test title 2", "author": "author 2", "author_email": "foo@example.com",
         "posted": null, "tags": ["dark"], "thread": "Well, that got dark quickly"},
    ]);
    let path = tmp.path().join("dump.json");
    std::fs::write(&path, dump.to_string()).unwrap();
    path.to_str().unwrap().to_string()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_cli_extract_to_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("meta.json");

    cmd()
        .args(["extract", "-o", output.to_str().unwrap(), &get_fixture_path("episodes")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed"));

    let records: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let ids: Vec<u64> = records.as_array().unwrap().iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(records[1]["author_email"], json!("foo@example.com"));
}

#[test]
fn test_cli_extract_default_output() {
    let tmp = TempDir::new().unwrap();
    let episodes = std::fs::canonicalize(get_fixture_path("episodes")).unwrap();

    cmd()
        .current_dir(tmp.path())
        .arg("extract")
        .arg(&episodes)
        .assert()
        .success();

    assert!(tmp.path().join("addventure_meta.json").exists());
}

#[test]
fn test_cli_extract_to_stdout() {
    cmd()
        .args(["extract", "-o", "-", &get_fixture_path("episodes/2.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Well, that got dark quickly"))
        .stdout(predicate::str::contains("\"dark\""));
}

#[test]
fn test_cli_extract_compact() {
    let output = cmd()
        .args(["extract", "--compact", "-o", "-", &get_fixture_path("episodes")])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("\n  "));
    assert_eq!(stdout_json(&output).as_array().unwrap().len(), 4);
}

#[test]
fn test_cli_extract_reports_failures() {
    let output = cmd()
        .args(["extract", "-o", "-", &get_fixture_path("episodes"), &get_fixture_path("broken")])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output).as_array().unwrap().len(), 4);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("5.html"));
    assert!(stderr.contains("id cross-check"));
    assert!(stderr.contains("back-link"));
}

#[test]
fn test_cli_extract_no_doublecheck() {
    let output = cmd()
        .args(["extract", "--no-doublecheck", "-o", "-", &get_fixture_path("broken/5.html")])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)[0]["id"], json!(6));
}

#[test]
fn test_cli_extract_requires_paths() {
    cmd().arg("extract").assert().failure();
}

#[test]
fn test_cli_reshape_index_by() {
    let tmp = TempDir::new().unwrap();
    let dump = write_dump(&tmp);

    let output = cmd().args(["reshape", "-i", &dump, "index-by", "thread"]).output().unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"null": [1, 3], "Well, that got dark quickly": [2, 4]})
    );
}

#[test]
fn test_cli_reshape_from_stdin() {
    let tmp = TempDir::new().unwrap();
    let dump = std::fs::read_to_string(write_dump(&tmp)).unwrap();

    let output = cmd()
        .args(["reshape", "-i", "-", "index-by", "--target", "title", "author"])
        .write_stdin(dump)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["author 1"], json!(["Test title 1", "Test title 3"]));
}

#[test]
fn test_cli_reshape_key_by_primary() {
    let tmp = TempDir::new().unwrap();
    let dump = write_dump(&tmp);

    let output = cmd()
        .args(["reshape", "-i", &dump, "key-by", "--is-primary", "id"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["2"]["author"], json!("author 2"));

    cmd()
        .args(["reshape", "-i", &dump, "key-by", "--is-primary", "thread"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("primary"));
}

#[test]
fn test_cli_reshape_flatten_to_file() {
    let tmp = TempDir::new().unwrap();
    let dump = write_dump(&tmp);
    let output = tmp.path().join("flat.json");

    cmd()
        .args(["reshape", "-i", &dump, "-o", output.to_str().unwrap(), "flatten", "--tag-separator", ","])
        .assert()
        .success();

    let flat: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(flat[2]["tags"], json!("waff,lime"));
    assert_eq!(flat[0]["id"], json!(1));
}

#[test]
fn test_cli_reshape_yaml() {
    let tmp = TempDir::new().unwrap();
    let dump = write_dump(&tmp);

    cmd()
        .args(["reshape", "-i", &dump, "-f", "yaml", "index-by", "thread"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Well, that got dark quickly"))
        .stdout(predicate::str::contains("- 2"));
}

#[test]
fn test_cli_reshape_missing_input() {
    cmd()
        .args(["reshape", "-i", "/nonexistent/addventure_meta.json", "flatten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_reshape_rejects_non_list() {
    cmd()
        .args(["reshape", "-i", "-", "flatten"])
        .write_stdin("{\"id\": 1}")
        .assert()
        .failure();
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("reshape"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("addventure"));
}

#[test]
fn test_cli_verbose_banner() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("meta.json");

    cmd()
        .args(["-v", "extract", "-o", output.to_str().unwrap(), &get_fixture_path("episodes/1.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Addventure"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("addventure"));
}
