#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn sdcaller(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sdcaller").unwrap();
    cmd.env("SDCALLER_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("SDCALLER_LOG");
    cmd
}

fn profile_file(home: &Path) -> PathBuf {
    home.join("sdcaller.user.json")
}

fn backups_in(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains("-backup-"))
        })
        .collect()
}

#[test]
fn test_create_then_show() {
    let temp = TempDir::new().unwrap();

    sdcaller(temp.path())
        .args(["create", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, Alice"));

    sdcaller(temp.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("Sessions"));

    assert!(profile_file(temp.path()).exists());
}

#[test]
fn test_show_without_profile() {
    let temp = TempDir::new().unwrap();
    sdcaller(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No profile yet"));
}

#[test]
fn test_invalid_name_is_rejected() {
    let temp = TempDir::new().unwrap();
    sdcaller(temp.path())
        .args(["create", "Alice & Bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid name"));

    assert!(!profile_file(temp.path()).exists());
}

#[test]
fn test_record_updates_stats() {
    let temp = TempDir::new().unwrap();
    sdcaller(temp.path()).args(["create", "Alice"]).assert().success();

    sdcaller(temp.path())
        .args(["record", "-c", "40", "-s", "3", "-f", "1"])
        .assert()
        .success();

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(profile_file(temp.path())).unwrap()).unwrap();
    assert_eq!(stored["stats"]["totalSessions"], 1);
    assert_eq!(stored["stats"]["totalCalls"], 40);
    assert_eq!(stored["stats"]["successfulSequences"], 3);
    assert_eq!(stored["stats"]["failedSequences"], 1);
}

#[test]
fn test_export_reset_import_round_trip() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let out = temp.path().join("out");

    sdcaller(&home).args(["create", "Alice"]).assert().success();
    sdcaller(&home)
        .args(["record", "-c", "12"])
        .assert()
        .success();
    let original = fs::read_to_string(profile_file(&home)).unwrap();

    sdcaller(&home)
        .args(["export", "--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));
    let backups = backups_in(&out);
    assert_eq!(backups.len(), 1);

    sdcaller(&home).args(["reset", "--yes"]).assert().success();
    assert!(!profile_file(&home).exists());

    sdcaller(&home)
        .args(["import", backups[0].to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored profile for Alice"));

    let restored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(profile_file(&home)).unwrap()).unwrap();
    let original: serde_json::Value = serde_json::from_str(&original).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn test_export_to_stdout() {
    let temp = TempDir::new().unwrap();
    sdcaller(temp.path()).args(["create", "Alice"]).assert().success();

    let output = sdcaller(temp.path())
        .args(["export", "--stdout"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["version"], "1.0.0");
    assert_eq!(envelope["user"]["name"], "Alice");
    assert!(envelope["timestamp"].is_i64());
}

#[test]
fn test_invalid_backup_leaves_profile_untouched() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    sdcaller(&home).args(["create", "Alice"]).assert().success();
    let before = fs::read_to_string(profile_file(&home)).unwrap();

    let bad = temp.path().join("bad.json");
    fs::write(
        &bad,
        r#"{"version":"1.0.0","timestamp":1700000000000,"user":{"name":"x"}}"#,
    )
    .unwrap();

    sdcaller(&home)
        .args(["import", "--yes", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a usable backup file"))
        .stderr(predicate::str::contains("user.id: is required"))
        .stderr(predicate::str::contains("-v for details").not());

    assert_eq!(fs::read_to_string(profile_file(&home)).unwrap(), before);
}

#[test]
fn test_declined_import_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let target = temp.path().join("target");

    sdcaller(&source).args(["create", "Bob"]).assert().success();
    sdcaller(&source)
        .args(["export", "--out", temp.path().to_str().unwrap()])
        .assert()
        .success();
    let backup = backups_in(temp.path()).remove(0);

    sdcaller(&target).args(["create", "Alice"]).assert().success();
    let before = fs::read_to_string(profile_file(&target)).unwrap();

    sdcaller(&target)
        .args(["import", backup.to_str().unwrap()])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Import cancelled"));

    assert_eq!(fs::read_to_string(profile_file(&target)).unwrap(), before);
}

#[test]
fn test_declined_reset_keeps_profile() {
    let temp = TempDir::new().unwrap();
    sdcaller(temp.path()).args(["create", "Alice"]).assert().success();

    sdcaller(temp.path())
        .arg("reset")
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset cancelled"));

    assert!(profile_file(temp.path()).exists());
}

#[test]
fn test_doctor_reports_healthy_store() {
    let temp = TempDir::new().unwrap();
    sdcaller(temp.path()).args(["create", "Alice"]).assert().success();

    sdcaller(temp.path())
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Storage is writable"));
}

#[test]
fn test_doctor_flags_corrupt_profile() {
    let temp = TempDir::new().unwrap();
    fs::write(profile_file(temp.path()), "{ not json").unwrap();

    sdcaller(temp.path()).arg("doctor").assert().code(2);
}

#[test]
fn test_config_set_and_get() {
    let temp = TempDir::new().unwrap();

    sdcaller(temp.path())
        .args(["config", "backup-prefix", "club"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backup-prefix set to club"));

    sdcaller(temp.path())
        .args(["config", "backup-prefix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("club"));

    sdcaller(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("backup-prefix = club"));
}

#[test]
fn test_configured_prefix_names_backup() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    sdcaller(temp.path())
        .args(["config", "backup-prefix", "club"])
        .assert()
        .success();

    sdcaller(temp.path())
        .args(["export", "--out", out.to_str().unwrap()])
        .assert()
        .success();

    let backups = backups_in(&out);
    assert_eq!(backups.len(), 1);
    let name = backups[0].file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("club-backup-"));
    assert!(name.ends_with(".json"));
}
