//! Help and version output

use crate::prelude::*;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn version_prints_crate_version() {
    Command::cargo_bin("gtask")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("gtask ").and(predicate::str::contains(
            env!("CARGO_PKG_VERSION"),
        )));
}

#[test]
fn missing_subcommand_prints_usage() {
    Command::cargo_bin("gtask")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn help_lists_commands() {
    Project::empty()
        .gtask()
        .args(&["--help"])
        .passes()
        .stdout_has("schedule")
        .stdout_has("worker")
        .stdout_has("validate");
}

#[test]
fn schedule_help_lists_run_and_start() {
    Project::empty()
        .gtask()
        .args(&["schedule", "--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("start");
}

#[test]
fn start_help_documents_tick() {
    Project::empty()
        .gtask()
        .args(&["schedule", "start", "--help"])
        .passes()
        .stdout_has("--tick")
        .stdout_has("--no-result-print");
}
