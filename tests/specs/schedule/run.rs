//! `gtask schedule run` specs

use crate::prelude::*;

const TASKS: &str = r#"
[[scheduled]]
id = "hello"
expr = "* * * * *"
command = "echo hello"

[[scheduled]]
id = "yearly"
expr = "0 0 1 1 *"
command = "echo happy new year"

[[scheduled]]
id = "mode"
expr = "* * * * *"
command = "printenv MODE"
expression = "MODE == prod"
[scheduled.envs]
mode = "dev"
"#;

#[test]
fn due_task_prints_result_block() {
    Project::with_tasks(TASKS)
        .gtask()
        .args(&["schedule", "run", "hello"])
        .passes()
        .stdout_has("====================")
        .stdout_has("Task hello finish with status 'succeed'")
        .stdout_has("Start at ")
        .stdout_has("output:\nhello\n");
}

#[test]
fn force_runs_task_that_is_not_due() {
    Project::with_tasks(TASKS)
        .gtask()
        .args(&["schedule", "run", "yearly", "--force"])
        .passes()
        .stdout_has("Task yearly finish with status 'succeed'")
        .stdout_has("happy new year");
}

#[test]
fn filter_excludes_other_tasks() {
    Project::with_tasks(TASKS)
        .gtask()
        .args(&["schedule", "run", "hello", "--force"])
        .passes()
        .stdout_has("Task hello")
        .stdout_lacks("Task yearly")
        .stdout_lacks("Task mode");
}

#[test]
fn false_guard_skips_task() {
    Project::with_tasks(TASKS)
        .gtask()
        .args(&["schedule", "run", "mode"])
        .passes()
        .stdout_has("Task mode finish with status 'skipped'")
        .stdout_lacks("output:");
}

#[test]
fn env_flag_overrides_task_env() {
    Project::with_tasks(TASKS)
        .gtask()
        .args(&["schedule", "run", "mode", "-e", "mode=prod"])
        .passes()
        .stdout_has("Task mode finish with status 'succeed'")
        .stdout_has("output:\nprod\n");
}

#[test]
fn failing_command_reports_error_and_still_exits_zero() {
    let tasks = r#"
[[scheduled]]
id = "broken"
expr = "* * * * *"
command = "sh -c 'echo oops; exit 3'"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["schedule", "run"])
        .passes()
        .stdout_has("Task broken finish with status 'failed'")
        .stdout_has("output:\noops\n")
        .stdout_has("Due to the following error:");
}

#[test]
fn missing_executable_is_reported() {
    let tasks = r#"
[[scheduled]]
id = "ghost"
expr = "* * * * *"
command = "gtask-no-such-binary --flag"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["schedule", "run"])
        .passes()
        .stdout_has("Task ghost finish with status 'failed'")
        .stdout_has("executable `gtask-no-such-binary` not found");
}

#[test]
fn result_path_appends_without_printing() {
    let project = Project::with_tasks(TASKS);

    project
        .gtask()
        .args(&[
            "schedule",
            "run",
            "hello",
            "--no-result-print",
            "--result-path",
            "logs/results.log",
        ])
        .passes()
        .stdout_lacks("Task hello");
    project
        .gtask()
        .args(&[
            "schedule",
            "run",
            "hello",
            "--no-result-print",
            "--result-path",
            "logs/results.log",
        ])
        .passes();

    let log = project.read("logs/results.log");
    assert_eq!(log.matches("Task hello finish with status 'succeed'").count(), 2);
}

#[test]
fn task_sees_identity_variables() {
    let tasks = r#"
[[scheduled]]
id = "whoami"
expr = "* * * * *"
command = "printenv GTASK_ID"
"#;
    Project::with_tasks(tasks)
        .gtask()
        .args(&["schedule", "run"])
        .passes()
        .stdout_has("output:\nwhoami\n");
}

#[test]
fn working_dir_flag_sets_task_directory() {
    let tasks = r#"
[[scheduled]]
id = "where"
expr = "* * * * *"
command = "ls"
"#;
    let project = Project::with_tasks(tasks).file("sub/marker.txt", "");
    let sub = project.path().join("sub");

    project
        .gtask()
        .args(&["schedule", "run", "-w", sub.to_str().unwrap()])
        .passes()
        .stdout_has("marker.txt");
}

#[test]
fn alternate_config_file() {
    Project::empty()
        .file("conf/other.toml", TASKS)
        .gtask()
        .args(&["-c", "conf/other.toml", "schedule", "run", "hello"])
        .passes()
        .stdout_has("Task hello finish with status 'succeed'");
}
