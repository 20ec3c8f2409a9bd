//! Integration tests for exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// `ferry` with its config isolated inside `home`
fn ferry(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ferry").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("FERRY_IMAGE");
    cmd
}

#[test]
fn test_local_copy_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("data.csv");
    let destination = temp_dir.path().join("copy/data.csv");
    fs::write(&source, "id,value\n").unwrap();

    ferry(temp_dir.path())
        .args(["data", "cp"])
        .arg(&source)
        .arg(&destination)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(destination).unwrap(), "id,value\n");
}

#[test]
fn test_compress_then_extract() {
    let temp_dir = TempDir::new().unwrap();
    let payload = temp_dir.path().join("payload");
    fs::create_dir_all(&payload).unwrap();
    fs::write(payload.join("a"), "a").unwrap();
    fs::write(payload.join("b"), "b").unwrap();
    let archive = temp_dir.path().join("payload.tar.gz");
    let extracted = temp_dir.path().join("extracted");

    ferry(temp_dir.path())
        .args(["data", "cp", "-c"])
        .arg(&payload)
        .arg(&archive)
        .assert()
        .success();
    assert!(archive.is_file());

    ferry(temp_dir.path())
        .args(["data", "cp", "-x"])
        .arg(&archive)
        .arg(&extracted)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(extracted.join("payload/b")).unwrap(), "b");
}

#[test]
fn test_forbidden_route_exit_code() {
    let temp_dir = TempDir::new().unwrap();

    ferry(temp_dir.path())
        .args(["data", "cp", "gs://bucket/a.csv", "s3://bucket/a.csv"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Copy from CLOUD to CLOUD is unsupported"));

    ferry(temp_dir.path())
        .args(["data", "cp", "storage:proj/a.csv", "/tmp/a.csv"])
        .assert()
        .code(3);
}

#[test]
fn test_gzip_directory_is_validation_error() {
    let temp_dir = TempDir::new().unwrap();
    let payload = temp_dir.path().join("payload");
    fs::create_dir_all(&payload).unwrap();
    fs::write(payload.join("a"), "a").unwrap();

    ferry(temp_dir.path())
        .args(["data", "cp", "-c"])
        .arg(&payload)
        .arg(temp_dir.path().join("payload.gz"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("use .tar.gz extension instead"));
}

#[test]
fn test_missing_source_is_io_error() {
    let temp_dir = TempDir::new().unwrap();

    ferry(temp_dir.path())
        .args(["data", "cp"])
        .arg(temp_dir.path().join("missing.csv"))
        .arg(temp_dir.path().join("copy.csv"))
        .assert()
        .code(2);
}

#[test]
fn test_config_path_and_show() {
    let temp_dir = TempDir::new().unwrap();

    ferry(temp_dir.path())
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    ferry(temp_dir.path())
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scheduler_command"));
}

// config lookup honors XDG_CONFIG_HOME on linux only
#[cfg(target_os = "linux")]
#[test]
fn test_remote_job_exit_code_is_propagated() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("platform");
    fs::write(
        &script,
        "#!/bin/sh\n\
         case \"$1\" in\n\
           run) echo job-9 ;;\n\
           status) echo '{\"status\": \"failed\", \"history\": {\"reason\": \"Error\", \"exit_code\": 5}}' ;;\n\
           logs) echo 'copy failed' ;;\n\
         esac\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let config_dir = temp_dir.path().join(".config/ferry");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!(
            "[remote]\n\
             image = \"ghcr.io/ferry-rs/ferry:test\"\n\
             presets = [\"cpu-small\"]\n\
             scheduler_command = \"{}\"\n\
             poll_interval = \"10ms\"\n",
            script.display()
        ),
    )
    .unwrap();

    ferry(temp_dir.path())
        .args(["data", "cp", "storage:proj/in/file.tar", "gs://bucket/out/file.tar"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("copy failed"))
        .stderr(predicate::str::contains("Copy job failed: error code 5"));
}
