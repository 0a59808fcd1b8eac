//! Basic CLI E2E tests.
//!
//! Each test runs the binary against its own temporary HOME so config and
//! database files never leak between tests.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitcluster"))
        .args(args)
        .env("HOME", home)
        .env_remove("HABITCLUSTER_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_habit_list_uses_default_config() {
    let home = tempfile::tempdir().unwrap();
    let habits = run_json(home.path(), &["habit", "list"]);
    let ids: Vec<_> = habits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&"yoga".to_string()));
    assert!(home.path().join(".config/habitcluster/config.toml").exists());
}

#[test]
fn test_record_is_idempotent() {
    let home = tempfile::tempdir().unwrap();
    let first = run_json(home.path(), &["checkin", "record", "yoga", "--date", "2025-01-10"]);
    assert_eq!(first["status"], "recorded");

    let second = run_json(home.path(), &["checkin", "record", "yoga", "--date", "2025-01-10"]);
    assert_eq!(second["status"], "already_recorded");
}

#[test]
fn test_cluster_status_after_check_ins() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["checkin", "record", "meditation", "--date", "2025-01-10"]);

    let status = run_json(home.path(), &["cluster", "status", "mental", "--date", "2025-01-10"]);
    assert_eq!(status["satisfied_count"], 1);
    assert_eq!(status["satisfied"], false);

    run_json(home.path(), &["checkin", "record", "not-yelling", "--date", "2025-01-10"]);
    let status = run_json(home.path(), &["cluster", "status", "mental", "--date", "2025-01-10"]);
    assert_eq!(status["satisfied_count"], 2);
    assert_eq!(status["satisfied"], true);
}

#[test]
fn test_streak_and_summary() {
    let home = tempfile::tempdir().unwrap();
    for d in ["2025-02-01", "2025-02-02", "2025-02-03"] {
        run_json(home.path(), &["checkin", "record", "gym", "--date", d]);
    }

    let streak = run_json(home.path(), &["streak", "physical", "--as-of", "2025-02-03"]);
    assert_eq!(streak["current"], 3);
    assert_eq!(streak["longest"], 3);
    assert_eq!(streak["tier"], "bronze");

    let range = run_json(
        home.path(),
        &["summary", "range", "physical", "--from", "2025-02-01", "--to", "2025-02-04"],
    );
    assert_eq!(range["satisfied_days"], 3);
    assert_eq!(range["total_days"], 4);

    let day = run_json(home.path(), &["summary", "day", "--date", "2025-03-01"]);
    assert_eq!(day["satisfied_clusters"], 0);
}

#[test]
fn test_unknown_ids_fail() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["checkin", "record", "rowing", "--date", "2025-01-01"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("rowing"));

    let (_, _, code) = run_cli(home.path(), &["cluster", "status", "spiritual"]);
    assert_ne!(code, 0);
}

#[test]
fn test_invalid_date_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["summary", "day", "--date", "01/02/2025"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid date"));
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "streak.lookback_days"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "0");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "streak.lookback_days", "30"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "streak.lookback_days"]);
    assert_eq!(stdout.trim(), "30");

    let (stdout, _, code) = run_cli(home.path(), &["config", "validate"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("3 clusters"));
}
