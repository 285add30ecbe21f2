//! Help, version and argument parsing.

#![allow(clippy::expect_used, deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn cane() -> Command {
    let mut cmd = Command::cargo_bin("cane-deploy").expect("cane-deploy binary should exist");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_help_flag_shows_help() {
    cane()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Provision a Raspberry Pi walking stick"));
}

#[test]
fn test_cli_help_lists_subcommands() {
    let output = cane().arg("--help").output().expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["deploy", "doctor", "manifest", "config", "version"] {
        assert!(stdout.contains(sub), "missing {sub} in:\n{stdout}");
    }
}

#[test]
fn test_cli_help_lists_target_flags() {
    cane()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--host"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--dest"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    cane()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cane-deploy 0.1.0"));
}

#[test]
fn test_version_command_shows_version() {
    cane()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cane-deploy 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = cane().args(["version", "--json"]).output().expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["version"], "0.1.0");
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    cane()
        .arg("reboot")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_port_is_usage_error() {
    cane()
        .args(["config", "show", "--port", "not-a-port"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--port"));
}
