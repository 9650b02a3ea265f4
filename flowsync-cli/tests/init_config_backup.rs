use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn flowsync_cmd(home: &Path, workspace: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_flowsync"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .current_dir(workspace);
    cmd
}

fn config_json(home: &Path, workspace: &Path, extra: &[&str]) -> serde_json::Value {
    let output = flowsync_cmd(home, workspace)
        .args(["config", "show", "--json"])
        .args(extra)
        .output()
        .expect("run flowsync config show");
    assert!(
        output.status.success(),
        "config show failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("config JSON")
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn init_writes_config_once_unless_forced() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");

    flowsync_cmd(home.path(), workspace.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Wrote default config"));

    let path = home.path().join(".flowsync/config.yaml");
    let yaml = fs::read_to_string(&path).expect("config file");
    assert!(yaml.contains("match_pattern:") && yaml.contains("flow-*.json"));
    assert!(yaml.contains("poll_interval_ms: 2000"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    flowsync_cmd(home.path(), workspace.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("--force"));

    flowsync_cmd(home.path(), workspace.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn config_show_applies_file_then_flags() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let dir = home.path().join(".flowsync");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(
        dir.join("config.yaml"),
        "match_pattern: \"export-*.json\"\npoll_interval_ms: 750\n",
    )
    .expect("write config");

    let from_file = config_json(home.path(), workspace.path(), &[]);
    assert_eq!(from_file["match_pattern"], "export-*.json");
    assert_eq!(from_file["poll_interval_ms"], 750);
    assert_eq!(from_file["error_backoff_ms"], 5000);
    assert_eq!(from_file["debounce_margin_ms"], 1000);

    let overridden = config_json(
        home.path(),
        workspace.path(),
        &["--poll-interval-ms", "100", "--debounce-ms", "0"],
    );
    assert_eq!(overridden["match_pattern"], "export-*.json");
    assert_eq!(overridden["poll_interval_ms"], 100);
    assert_eq!(overridden["debounce_margin_ms"], 0);
}

#[test]
fn explicit_config_must_exist() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");

    flowsync_cmd(home.path(), workspace.path())
        .args(["config", "show", "--config", "missing.yaml"])
        .assert()
        .failure()
        .stderr(contains("config file not found"));
}

#[test]
fn malformed_config_file_is_reported() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let path = workspace.path().join("flowsync.yaml");
    fs::write(&path, "surprise_key: 1\n").expect("write config");

    flowsync_cmd(home.path(), workspace.path())
        .args(["sync", "--dry-run", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("failed to load config"));
}

#[test]
fn malformed_home_config_is_reported() {
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let dir = home.path().join(".flowsync");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(dir.join("config.yaml"), "poll_interval_ms: [not, a, number]\n")
        .expect("write config");

    flowsync_cmd(home.path(), workspace.path())
        .args(["status", "--json"])
        .assert()
        .failure()
        .stderr(contains("failed to load ~/.flowsync/config.yaml"));
}

#[test]
fn backup_outside_repository_fails() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let home = TempDir::new().expect("home");
    let workspace = TempDir::new().expect("workspace");
    let plain = workspace.path().join("plain");
    fs::create_dir_all(&plain).expect("plain dir");

    let output = flowsync_cmd(home.path(), workspace.path())
        .env("GIT_CEILING_DIRECTORIES", workspace.path())
        .args(["backup", "--repo"])
        .arg(&plain)
        .output()
        .expect("run flowsync backup");

    assert!(!output.status.success(), "backup must fail outside a repo");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not a git repository"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn backup_in_clean_repository_reports_no_changes() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let home = TempDir::new().expect("home");
    let repo = TempDir::new().expect("repo");
    let git = |args: &[&str]| {
        let status = Command::new("git")
            .args(args)
            .current_dir(repo.path())
            .env("HOME", home.path())
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {} failed", args.join(" "));
    };
    git(&["init", "-q"]);
    git(&["config", "user.name", "Flowsync Test"]);
    git(&["config", "user.email", "flowsync@example.invalid"]);
    git(&["config", "commit.gpgsign", "false"]);
    fs::write(repo.path().join("flow.json"), "{}").expect("seed");
    git(&["add", "."]);
    git(&["commit", "-q", "-m", "seed"]);

    flowsync_cmd(home.path(), repo.path())
        .arg("backup")
        .assert()
        .success()
        .stdout(contains("no changes to commit"))
        .stdout(contains("backup/"));
}
