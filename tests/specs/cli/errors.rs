//! Failures reported before any task runs

use crate::prelude::*;

const ONE_TASK: &str = r#"
[[scheduled]]
id = "hello"
expr = "* * * * *"
command = "echo hello"
"#;

#[test]
fn missing_task_file_fails() {
    Project::empty()
        .gtask()
        .args(&["schedule", "run"])
        .fails()
        .stderr_has("cannot read task file tasks.toml")
        .stderr_has("gtask -c <FILE>");
}

#[test]
fn malformed_toml_fails() {
    Project::with_tasks("[[scheduled]\nid = ")
        .gtask()
        .args(&["schedule", "run"])
        .fails()
        .stderr_has("is not valid TOML");
}

#[test]
fn invalid_task_file_lists_every_issue() {
    let tasks = r#"
[[scheduled]]
id = "broken"
expr = "not a cron"
command = "true"

[[scheduled]]
id = "broken"
expr = "* * * * *"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["schedule", "run"])
        .fails()
        .stderr_has("has 3 error(s)")
        .stderr_has("missing required field `command`")
        .stderr_has("declared more than once");
}

#[test]
fn unknown_filter_id_fails() {
    Project::with_tasks(ONE_TASK)
        .gtask()
        .args(&["schedule", "run", "hello,nope"])
        .fails()
        .stderr_has("unknown task id(s): nope")
        .stderr_has("Declared scheduled tasks: hello");
}

#[test]
fn zero_tick_is_rejected() {
    Project::with_tasks(ONE_TASK)
        .gtask()
        .args(&["schedule", "start", "--tick", "0m"])
        .fails()
        .stderr_has("tick must be greater than zero");
}

#[test]
fn fractional_tick_is_rejected() {
    Project::with_tasks(ONE_TASK)
        .gtask()
        .args(&["schedule", "start", "--tick", "90s"])
        .fails()
        .stderr_has("whole number of minutes");
}

#[test]
fn unknown_time_zone_fails_run() {
    Project::with_tasks(ONE_TASK)
        .gtask()
        .args(&["schedule", "run", "-t", "US/Wrong"])
        .fails()
        .stderr_has("US/Wrong");
}

#[test]
fn unknown_time_zone_fails_start_immediately() {
    Project::with_tasks(ONE_TASK)
        .gtask()
        .args(&["schedule", "start", "-t", "US/Wrong"])
        .fails()
        .stderr_has("US/Wrong");
}

#[test]
fn malformed_env_flag_is_rejected() {
    Project::with_tasks(ONE_TASK)
        .gtask()
        .args(&["schedule", "run", "-e", "=value"])
        .fails();
}
