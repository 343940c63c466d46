//! CLI contract tests
//!
//! Runs the built binary against the fixtures and checks exit codes,
//! output formats and config discovery.

use std::path::{Path, PathBuf};
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_blueprint-analyzer")
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run blueprint-analyzer");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Copy a fixture into a fresh directory, so config discovery sees only
/// what the test puts there
fn isolated(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::copy(fixture(name), &path).unwrap();
    (dir, path)
}

#[test]
fn test_analyze_json_to_stdout() {
    let path = fixture("door.json");
    let (code, stdout, _) = run(&["analyze", path.to_str().unwrap()]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(parsed["graph_id"], "BP_Door");
    assert_eq!(parsed["generated_at"], "2025-01-01T00:00:00+00:00");
    assert_eq!(parsed["findings"].as_array().unwrap().len(), 7);
    assert_eq!(parsed["metrics"]["graph"]["node_count"], 10);
}

#[test]
fn test_analyze_output_is_byte_stable() {
    let path = fixture("door.json");
    let (_, first, _) = run(&["--workers", "1", "analyze", path.to_str().unwrap()]);
    let (_, second, _) = run(&["--workers", "8", "analyze", path.to_str().unwrap()]);
    assert_eq!(first, second);
}

#[test]
fn test_fail_on() {
    let path = fixture("door.json");
    let (code, _, stderr) = run(&["analyze", path.to_str().unwrap(), "--fail-on", "error"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--fail-on=error"));

    let trivial = fixture("trivial.json");
    let (code, _, _) = run(&["analyze", trivial.to_str().unwrap(), "--fail-on", "error"]);
    assert_eq!(code, 0);
}

#[test]
fn test_text_report_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.txt");
    let path = fixture("door.json");
    let (code, stdout, _) = run(&[
        "analyze",
        path.to_str().unwrap(),
        "--format",
        "text",
        "--output",
        out.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Blueprint analysis: BP_Door"));
    assert!(text.contains("[E] dangling-pin (pin set_count.value)"));
}

#[test]
fn test_stamp_only_when_missing() {
    let path = fixture("trivial.json");
    let (_, stdout, _) = run(&["analyze", path.to_str().unwrap()]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["generated_at"].is_null());

    let (_, stdout, _) = run(&["analyze", path.to_str().unwrap(), "--stamp"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["generated_at"].is_string());
}

#[test]
fn test_config_discovered_next_to_snapshot() {
    let (dir, path) = isolated("door.json");
    std::fs::write(
        dir.path().join("blueprint-analyzer.toml"),
        "enabled_rules = [\"dead-cycle\"]\n",
    )
    .unwrap();

    let (code, stdout, _) = run(&["analyze", path.to_str().unwrap()]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let findings = parsed["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["rule_id"], "dead-cycle");
}

#[test]
fn test_unparseable_config_is_an_error() {
    let (dir, path) = isolated("door.json");
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "enabled_rules = [").unwrap();

    let (code, _, stderr) = run(&[
        "analyze",
        path.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to parse config"));
}

#[test]
fn test_malformed_snapshot_fails() {
    let path = fixture("malformed.json");
    let (code, stdout, stderr) = run(&["analyze", path.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Malformed graph snapshot"));
}

#[test]
fn test_rules_lists_builtins() {
    let (code, stdout, _) = run(&["rules"]);
    assert_eq!(code, 0);
    for id in ["unreachable-node", "dead-cycle", "dangling-pin", "trivial-graph", "missing-entry"] {
        assert!(stdout.contains(id), "missing {}", id);
    }
}

#[test]
fn test_init_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run(&["init", dir.path().to_str().unwrap()]);
    assert_eq!(code, 0);

    let written = std::fs::read_to_string(dir.path().join("blueprint-analyzer.toml")).unwrap();
    assert!(written.contains("exec_fan_in = \"warn\""));
}
