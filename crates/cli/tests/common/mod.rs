// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Temp project holding `tasks.toml`
pub fn setup_test_env(tasks: &str) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(temp.path().join("tasks.toml"), tasks).expect("Failed to write tasks.toml");
    temp
}

/// Spawn gtask in `dir` with stderr piped for log inspection
#[allow(deprecated)]
pub fn spawn_gtask(dir: &TempDir, args: &[&str]) -> Child {
    Command::new(assert_cmd::cargo::cargo_bin("gtask"))
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn gtask")
}

/// Read log lines until one contains `needle`; false on EOF
pub fn wait_for_log(stderr: ChildStderr, needle: &str) -> bool {
    BufReader::new(stderr)
        .lines()
        .map_while(Result::ok)
        .any(|line| line.contains(needle))
}

/// Deliver `signal` (e.g. "TERM") to the child
pub fn send_signal(child: &Child, signal: &str) {
    let status = Command::new("kill")
        .args([&format!("-{signal}"), &child.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(status.success(), "kill -{signal} failed");
}

/// Poll until the child exits or `timeout` elapses
pub fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().expect("Failed to poll child") {
            return Some(status);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    None
}
