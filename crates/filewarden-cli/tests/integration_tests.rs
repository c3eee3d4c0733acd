//! Integration tests for the filewarden binary.
//!
//! Each test runs the real binary against a temporary store root.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_filewarden"))
}

/// Run the binary with `--root` set and no inherited log filter.
fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(binary())
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("FILEWARDEN_ROOT")
        .output()
        .expect("Failed to run filewarden")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn create_test_env() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(temp_dir.path().join("files/public")).unwrap();
    temp_dir
}

#[test]
fn test_execute_without_start_reports_guidance() {
    let temp_dir = create_test_env();
    let output = run(temp_dir.path(), &["checking-execute", "5"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("checking-start"));
}

#[test]
fn test_full_checking_cycle() {
    let temp_dir = create_test_env();
    std::fs::write(temp_dir.path().join("files/public/a.png"), b"a").unwrap();

    let output = run(
        temp_dir.path(),
        &["catalog-add", "public://a.png", "public://b.png"],
    );
    assert!(output.status.success());

    let output = run(temp_dir.path(), &["checking-start"]);
    assert!(stdout(&output).contains("requested for 2 files"));

    let output = run(temp_dir.path(), &["checking-start"]);
    assert!(stdout(&output).contains("already requested"));

    let output = run(temp_dir.path(), &["checking-execute", "30", "--log"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("missing: public://b.png"));
    assert!(text.contains("2/2 checked, 1 missing"));
    assert!(text.contains("finished"));

    let output = run(temp_dir.path(), &["--json", "checking-status"]);
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["status"], "finished");
    assert_eq!(status["missing_count"], 1);
}

#[test]
fn test_cancel_stops_execution() {
    let temp_dir = create_test_env();
    run(temp_dir.path(), &["catalog-add", "public://a.png"]);
    run(temp_dir.path(), &["checking-start"]);

    let output = run(temp_dir.path(), &["checking-cancel"]);
    assert!(stdout(&output).contains("cancelled"));

    let output = run(temp_dir.path(), &["--json", "checking-execute", "5"]);
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["aborted"], true);
}

#[test]
fn test_repair_moves_file() {
    let temp_dir = create_test_env();
    std::fs::write(temp_dir.path().join("files/public/y.png"), b"y").unwrap();
    run(temp_dir.path(), &["catalog-add", "public://x.png"]);

    let mapping = temp_dir.path().join("map.csv");
    std::fs::write(&mapping, "public://x.png;public://y.png\n").unwrap();

    let output = run(
        temp_dir.path(),
        &[
            "checking-repair",
            mapping.to_str().unwrap(),
            "--legacy",
            "--delimiter",
            ";",
            "--log",
        ],
    );
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("line 1: moved"));
    assert!(text.contains("1 moved, 0 skipped, 0 errors"));
    assert!(temp_dir.path().join("files/public/x.png").exists());
}

#[test]
fn test_repair_structural_error_exits_non_zero() {
    let temp_dir = create_test_env();
    let mapping = temp_dir.path().join("map.csv");
    std::fs::write(&mapping, "1,x,image,public://x.png,public://y.png\n1,x\n").unwrap();

    let output = run(
        temp_dir.path(),
        &["checking-repair", mapping.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[test]
fn test_custom_scheme_root() {
    let temp_dir = create_test_env();
    let archive = temp_dir.path().join("archive");
    std::fs::create_dir_all(&archive).unwrap();
    std::fs::write(archive.join("doc.pdf"), b"%PDF").unwrap();
    let scheme = format!("archive={}", archive.display());

    run(temp_dir.path(), &["catalog-add", "archive://doc.pdf"]);
    run(temp_dir.path(), &["checking-start"]);
    let output = run(
        temp_dir.path(),
        &["--scheme", &scheme, "--json", "checking-execute", "10"],
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["finished"], true);
    assert_eq!(report["files_missing_count"], 0);
}

#[test]
fn test_json_output_uses_snake_case_keys() {
    let temp_dir = create_test_env();

    let output = run(temp_dir.path(), &["--json", "catalog-add", "public://gone.png"]);
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(records[0].get("checked_at").is_some());
    assert!(records[0].get("checkedAt").is_none());

    run(temp_dir.path(), &["checking-start"]);
    let output = run(
        temp_dir.path(),
        &["--json", "checking-execute", "10", "--log"],
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_missing_count"], 1);
    assert_eq!(report["missing_files"][0]["uri"], "public://gone.png");
    assert_eq!(report["missing_files"][0]["status"], "missing");
}
