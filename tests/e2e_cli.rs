//! CLI end-to-end tests
//!
//! Tests for the mosaic command-line interface that need no ffmpeg install.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the mosaic binary
#[allow(deprecated)]
fn mosaic_cmd() -> Command {
    Command::cargo_bin("mosaic").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    mosaic_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_lists_commands() {
    mosaic_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hls"))
        .stdout(predicate::str::contains("dash"))
        .stdout(predicate::str::contains("check-tools"));
}

#[test]
fn test_cli_version_command() {
    mosaic_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "mosaic {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_validate_defaults() {
    let dir = tempdir().unwrap();
    mosaic_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Low-resolution policy: force_baseline"));
}

#[test]
fn test_cli_validate_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mosaic.toml");
    fs::write(
        &path,
        "[encoder]\nthreads = 8\ngpu = \"nvenc\"\n\n[ladder]\nlow_resolution = \"skip\"\n",
    )
    .unwrap();

    mosaic_cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Threads: 8"))
        .stdout(predicate::str::contains("GPU: nvenc"))
        .stdout(predicate::str::contains("Low-resolution policy: skip"));
}

#[test]
fn test_cli_validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[encoder]\nthreads = 999\n").unwrap();

    mosaic_cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("threads"));
}

#[test]
fn test_cli_rejects_unknown_profile() {
    mosaic_cmd()
        .args(["hls", "in.mp4", "out", "--profile", "archive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown profile"));
}

#[test]
fn test_cli_missing_ffprobe_reports_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mosaic.toml");
    fs::write(
        &path,
        "[tools]\nffprobe_path = \"/nonexistent/bin/ffprobe\"\n",
    )
    .unwrap();

    mosaic_cmd()
        .arg("--config")
        .arg(&path)
        .args(["probe", "in.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("falling back to PATH"))
        .stderr(predicate::str::contains("Failed to probe in.mp4"));
}

#[cfg(unix)]
#[test]
fn test_cli_check_tools_uses_configured_paths() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    for name in ["ffmpeg", "ffprobe"] {
        let script = dir.path().join(format!("fake-{}", name));
        fs::write(&script, format!("#!/bin/sh\necho '{} version 0.0-fake'\n", name)).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    }
    let path = dir.path().join("mosaic.toml");
    fs::write(
        &path,
        format!(
            "[tools]\nffmpeg_path = \"{0}/fake-ffmpeg\"\nffprobe_path = \"{0}/fake-ffprobe\"\n",
            dir.path().display()
        ),
    )
    .unwrap();

    mosaic_cmd()
        .arg("--config")
        .arg(&path)
        .arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg (ffmpeg version 0.0-fake)"))
        .stdout(predicate::str::contains("ffprobe (ffprobe version 0.0-fake)"))
        .stdout(predicate::str::contains("All required tools are available!"));
}
