//! `gtask validate` specs

use crate::prelude::*;

#[test]
fn valid_file_reports_counts() {
    let tasks = r#"
[[scheduled]]
id = "ping"
expr = "@every 5m"
command = "true"

[[workers]]
id = "queue"
command = "sleep 60"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["validate"])
        .passes()
        .stdout_has("tasks.toml is valid: 1 scheduled task(s), 1 worker(s)");
}

#[test]
fn invalid_guard_is_reported() {
    let tasks = r#"
[[scheduled]]
id = "guarded"
expr = "* * * * *"
command = "true"
expression = "MODE & prod"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["validate"])
        .fails()
        .stderr_has("scheduled `guarded`: invalid guard expression");
}

#[test]
fn reboot_alias_is_rejected() {
    let tasks = r#"
[[scheduled]]
id = "boot"
expr = "@reboot"
command = "true"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["validate"])
        .fails()
        .stderr_has("scheduled `boot`");
}

#[test]
fn forbidden_id_character_is_reported() {
    let tasks = r#"
[[workers]]
id = "bad id"
command = "true"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["validate"])
        .fails()
        .stderr_has("forbidden character");
}
