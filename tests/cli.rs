use assert_cmd::Command;
use predicates::prelude::*;

fn issue_tracker() -> Command {
    let mut cmd = Command::cargo_bin("issue-tracker").expect("binary builds");
    cmd.env_remove("ISSUES_CONFIG")
        .env_remove("ISSUES_BIND")
        .env_remove("ISSUES_STORE")
        .env_remove("ISSUES_LOG_JSON")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_flags() {
    issue_tracker()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--store"))
        .stdout(predicate::str::contains("/api/issues/{project}"));
}

#[test]
fn test_version() {
    issue_tracker()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    issue_tracker()
        .current_dir(dir.path())
        .args(["--config", "absent.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"))
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_invalid_bind_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    issue_tracker()
        .current_dir(dir.path())
        .args(["--bind", "not-an-address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid bind address"));
}

#[test]
fn test_unknown_config_key_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("issues.yaml"), "port: 80\n").expect("write config");
    issue_tracker()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key 'port'"));
}

#[test]
fn test_corrupt_store_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("issues.jsonl");
    std::fs::write(&store, "{not json}\n").expect("write store");
    issue_tracker()
        .current_dir(dir.path())
        .arg("--store")
        .arg(&store)
        .args(["--bind", "127.0.0.1:0", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open issue store"));
}
