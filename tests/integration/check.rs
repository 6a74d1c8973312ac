//! Integration tests for the `yx-coherence` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper function to get the path to the yx-coherence binary
fn coherence_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove "deps"
    path.push("yx-coherence");
    path
}

/// Helper function to create a test file
fn create_test_file(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Run the binary with the user config directory pointed into `dir`
fn run(
    dir: &TempDir,
    args: &[&str],
) -> Output {
    Command::new(coherence_bin())
        .args(args)
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .output()
        .unwrap()
}

fn check(
    dir: &TempDir,
    graph: &Path,
    extra: &[&str],
) -> Output {
    let graph = graph.to_str().unwrap();
    let mut args = vec!["check", graph, "--no-color"];
    args.extend_from_slice(extra);
    run(dir, &args)
}

const CLEAN: &str = r#"{
  "modules": [
    { "id": "core", "traits": [{ "name": "Show" }], "types": [{ "name": "Id" }],
      "impls": [{ "id": "show_id", "trait": "Show", "for": "Id" }] },
    { "id": "app", "deps": ["core"], "types": [{ "name": "AppType" }],
      "impls": [{ "id": "show_app", "trait": "Show", "for": "AppType" }] }
  ]
}"#;

const ORPHAN: &str = r#"{
  "modules": [
    { "id": "core", "traits": [{ "name": "Show" }], "types": [{ "name": "Id" }] },
    { "id": "app", "deps": ["core"],
      "impls": [{ "id": "show_id", "trait": "Show", "for": "Id" }] }
  ]
}"#;

const DUPLICATE: &str = r#"{
  "modules": [
    { "id": "core", "traits": [{ "name": "Show" }] },
    { "id": "app", "deps": ["core"], "types": [{ "name": "AppType" }],
      "impls": [
        { "id": "first", "trait": "Show", "for": "AppType" },
        { "id": "second", "trait": "Show", "for": "AppType" }
      ] }
  ]
}"#;

#[test]
fn test_check_clean_graph() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(&temp_dir, "graph.json", CLEAN);

    let output = check(&temp_dir, &graph, &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("module 'core': 1 accepted, 0 orphan, 0 conflicting, 0 duplicate"));
    assert!(stdout.contains("module 'app': 1 accepted"));
}

#[test]
fn test_check_orphan_fails() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(&temp_dir, "graph.json", ORPHAN);

    let output = check(&temp_dir, &graph, &["--module", "app"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("error[E4010]"));
    assert!(stdout.contains("show_id"));
    assert!(!stdout.contains("module 'core'"));
}

#[test]
fn test_check_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(&temp_dir, "graph.json", ORPHAN);

    let output = check(&temp_dir, &graph, &["--format", "json", "-m", "app"]);

    assert!(!output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["has_errors"], true);
    let report = &parsed["reports"][0];
    assert_eq!(report["module"], "app");
    assert_eq!(report["summary"]["orphan"], 1);
    assert_eq!(report["records"][0]["rejection"]["reason"], "OrphanViolation");
    assert_eq!(report["diagnostics"][0]["code"], "E4010");
}

#[test]
fn test_check_ron_graph() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(
        &temp_dir,
        "graph.ron",
        r#"(modules: [(id: "core", traits: [(name: "Show")], types: [(name: "Id")])])"#,
    );

    let output = check(&temp_dir, &graph, &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("module 'core': 0 accepted"));
}

#[test]
fn test_check_cycle_fails() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(
        &temp_dir,
        "graph.json",
        r#"{ "modules": [{ "id": "a", "deps": ["b"] }, { "id": "b", "deps": ["a"] }] }"#,
    );

    let output = check(&temp_dir, &graph, &["-m", "a"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("error[E5004]"));
    assert!(stdout.contains("a -> b -> a"));
    assert!(stdout.contains("module 'a': check aborted"));
}

#[test]
fn test_check_duplicates_policy() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(&temp_dir, "graph.json", DUPLICATE);

    // 重复实现默认只是提示
    let output = check(&temp_dir, &graph, &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("info[E4011]"));

    let output = check(&temp_dir, &graph, &["--deny-duplicates"]);
    assert!(!output.status.success());
}

#[test]
fn test_project_config_denies_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(&temp_dir, "graph.json", DUPLICATE);
    create_test_file(
        &temp_dir,
        "coherence.toml",
        "[check]\ndeny_duplicates = true\nparallel = false\n",
    );

    let output = check(&temp_dir, &graph, &[]);
    assert!(!output.status.success());
}

#[test]
fn test_explicit_config_replaces_project_config() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(&temp_dir, "graph.json", DUPLICATE);
    create_test_file(&temp_dir, "coherence.toml", "[check]\ndeny_duplicates = true\n");
    let explicit = create_test_file(&temp_dir, "lenient.toml", "[output]\nlang = \"zh\"\n");

    let output = check(&temp_dir, &graph, &["--config", explicit.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("重复"));
}

#[test]
fn test_check_malformed_config() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(&temp_dir, "graph.json", CLEAN);
    create_test_file(&temp_dir, "coherence.toml", "[check]\nunknown_key = 1\n");

    let output = check(&temp_dir, &graph, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"));
}

#[test]
fn test_check_missing_graph() {
    let temp_dir = TempDir::new().unwrap();
    let graph = temp_dir.path().join("missing.json");

    let output = check(&temp_dir, &graph, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to check"));
}

#[test]
fn test_check_unresolved_name() {
    let temp_dir = TempDir::new().unwrap();
    let graph = create_test_file(
        &temp_dir,
        "graph.json",
        r#"{ "modules": [{ "id": "app", "impls": [{ "trait": "Show", "for": "Id" }] }] }"#,
    );

    let output = check(&temp_dir, &graph, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Show"));
}

#[test]
fn test_explain_known_code() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&temp_dir, &["explain", "e4010"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("E4010"));
    assert!(stdout.contains("Orphan implementation"));
}

#[test]
fn test_explain_in_chinese() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&temp_dir, &["explain", "E5004", "--lang", "zh"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("循环依赖"));
}

#[test]
fn test_explain_lists_codes_by_category() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&temp_dir, &["explain"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let generic = stdout.find("Generic:").unwrap();
    let module = stdout.find("Module:").unwrap();
    let internal = stdout.find("Internal:").unwrap();
    assert!(generic < module && module < internal);
    assert!(stdout.contains("E4010  Orphan implementation"));
    assert!(stdout.contains("E5004  Circular dependency"));
    assert!(stdout.contains("E8001  Internal error"));
}

#[test]
fn test_explain_unknown_code() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&temp_dir, &["explain", "E9999"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown error code"));
}

#[test]
fn test_version() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&temp_dir, &["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
