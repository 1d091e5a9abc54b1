//! Integration tests for the `clasp` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn create_test_file(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Run the binary inside `dir` so no stray `clasp.toml` is picked up
fn clasp(
    dir: &Path,
    args: &[&str],
) -> Output {
    Command::new(env!("CARGO_BIN_EXE_clasp"))
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_check_valid_file() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "valid.cl", "total := 1 + 2 * 3\n");

    let output = clasp(temp_dir.path(), &["check", "valid.cl"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_check_reports_first_error_with_caret() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "broken.cl", "a = 1\nx = 1 2\n");

    let output = clasp(temp_dir.path(), &["--no-color", "check", "broken.cl"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.cl:2:7: error: expected operator"), "{stderr}");
    assert!(stderr.contains("   2 | x = 1 2"), "{stderr}");
    assert!(stderr.contains("|       ^"), "{stderr}");
}

#[test]
fn test_json_diagnostics() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "broken.cl", "s = \"open");

    let output = clasp(temp_dir.path(), &["--json", "check", "broken.cl"]);
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(value["stage"], "lex");
    assert_eq!(value["position"], 4);
    assert_eq!(value["location"]["column"], 5);
}

#[test]
fn test_check_stats_as_json() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "names.cl", "first := second + third\n");

    let output = clasp(temp_dir.path(), &["--json", "check", "names.cl", "--stats"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["names"].as_u64().unwrap() >= 3);
    assert!(value["classes"]["records"].is_u64());
}

#[test]
fn test_token_listing() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "list.cl", "count = 42");

    let output = clasp(temp_dir.path(), &["tokens", "list.cl"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert!(lines[0].contains("identifier") && lines[0].ends_with("count"), "{stdout}");
    assert!(lines.last().unwrap().contains("terminator"), "{stdout}");
}

#[test]
fn test_ast_listing_is_postfix() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "expr.cl", "1 + 2 * 3");

    let output = clasp(temp_dir.path(), &["ast", "expr.cl"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let multiply = stdout.find(" * ").unwrap();
    let add = stdout.find(" + ").unwrap();
    assert!(multiply < add, "{stdout}");
}

#[test]
fn test_config_file_limits() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir, "clasp.toml", "[limits]\nscope_depth = 1\n");
    create_test_file(&temp_dir, "deep.cl", "((a))");

    let output = clasp(temp_dir.path(), &["--json", "check", "deep.cl"]);
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(value["message"], "too many nested scopes");
}

#[test]
fn test_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = clasp(temp_dir.path(), &["check", "missing.cl"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read file"), "{stderr}");
}

#[test]
fn test_version() {
    let temp_dir = TempDir::new().unwrap();
    let output = clasp(temp_dir.path(), &["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("clasp "));
}
