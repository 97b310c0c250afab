use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn mailrag_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("mailrag");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/mailrag.sqlite"

[chunking]
max_chunk_size = 200

[server]
bind = "127.0.0.1:7401"
"#,
        root.display()
    );

    let config_path = config_dir.join("mailrag.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_mailrag(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = mailrag_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run mailrag binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_mailrag(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_mailrag(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_mailrag(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_add_list_get_remove() {
    let (_tmp, config_path) = setup_test_env();
    run_mailrag(&config_path, &["init"]);

    let (stdout, stderr, success) = run_mailrag(
        &config_path,
        &["add", "Subject: test\n\nThe meeting moved to Thursday."],
    );
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("stored email 1"));

    let (stdout, _, success) = run_mailrag(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("Subject: test"));
    assert!(stdout.contains("1 emails"));

    let (stdout, _, success) = run_mailrag(&config_path, &["get", "1"]);
    assert!(success);
    assert!(stdout.contains("The meeting moved to Thursday."));

    let (stdout, _, success) = run_mailrag(&config_path, &["remove", "1"]);
    assert!(success);
    assert!(stdout.contains("deleted email 1"));

    let (stdout, _, _) = run_mailrag(&config_path, &["list"]);
    assert!(stdout.contains("no emails stored"));
}

#[test]
fn test_get_missing_email_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_mailrag(&config_path, &["init"]);

    let (_, stderr, success) = run_mailrag(&config_path, &["get", "99"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_add_rejects_empty_content() {
    let (_tmp, config_path) = setup_test_env();
    run_mailrag(&config_path, &["init"]);

    let (_, stderr, success) = run_mailrag(&config_path, &["add", "   "]);
    assert!(!success);
    assert!(stderr.contains("must not be empty"));
}

#[test]
fn test_seed_is_deterministic() {
    let (_tmp_a, config_a) = setup_test_env();
    let (_tmp_b, config_b) = setup_test_env();

    run_mailrag(&config_a, &["init"]);
    run_mailrag(&config_b, &["init"]);

    let (stdout, _, success) = run_mailrag(&config_a, &["seed", "--count", "6"]);
    assert!(success);
    assert!(stdout.contains("seeded 6 emails"));
    run_mailrag(&config_b, &["seed", "--count", "6"]);

    let (body_a, _, _) = run_mailrag(&config_a, &["get", "3"]);
    let (body_b, _, _) = run_mailrag(&config_b, &["get", "3"]);
    // created_at differs between runs; compare the body line.
    assert!(body_a.contains("Ref: MSG-0003"));
    let content_a: Vec<&str> = body_a.lines().skip(2).collect();
    let content_b: Vec<&str> = body_b.lines().skip(2).collect();
    assert_eq!(content_a, content_b);
}

#[test]
fn test_seed_skips_populated_store() {
    let (_tmp, config_path) = setup_test_env();
    run_mailrag(&config_path, &["init"]);
    run_mailrag(&config_path, &["add", "Existing email."]);

    let (stdout, _, success) = run_mailrag(&config_path, &["seed"]);
    assert!(success);
    assert!(stdout.contains("seed skipped"));
}

#[test]
fn test_index_run_dry_run_counts_chunks() {
    let (_tmp, config_path) = setup_test_env();
    run_mailrag(&config_path, &["init"]);
    run_mailrag(&config_path, &["seed", "--count", "4"]);

    let (stdout, stderr, success) = run_mailrag(&config_path, &["index", "run", "--dry-run"]);
    assert!(success, "dry run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("documents: 4"));
}

#[test]
fn test_index_run_requires_provider() {
    let (_tmp, config_path) = setup_test_env();
    run_mailrag(&config_path, &["init"]);

    // The test config leaves [index] at its "disabled" default.
    let (_, stderr, success) = run_mailrag(&config_path, &["index", "run"]);
    assert!(!success);
    assert!(stderr.contains("disabled"));
}

#[test]
fn test_query_requires_providers() {
    let (_tmp, config_path) = setup_test_env();
    run_mailrag(&config_path, &["init"]);

    let (_, stderr, success) = run_mailrag(&config_path, &["query", "anything?"]);
    assert!(!success);
    assert!(stderr.contains("disabled"));
}

#[test]
fn test_rejects_invalid_config() {
    let (tmp, _) = setup_test_env();
    let bad_config = tmp.path().join("config").join("bad.toml");
    fs::write(
        &bad_config,
        r#"[db]
path = "/tmp/mailrag-test.sqlite"

[retrieval]
score_threshold = 2.0

[server]
bind = "127.0.0.1:7401"
"#,
    )
    .unwrap();

    let (_, stderr, success) = run_mailrag(&bad_config, &["init"]);
    assert!(!success);
    assert!(stderr.contains("score_threshold"));
}
