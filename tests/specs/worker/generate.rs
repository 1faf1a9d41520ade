//! `gtask worker generate` specs

use crate::prelude::*;

const WORKERS: &str = r#"
[[workers]]
id = "queue"
command = "php artisan queue:work --name=${GTASK_PREFIXED_NAME}"
[workers.envs]
queue = "default"

[[workers]]
id = "mailer"
command = "bin/mailer"
user = "mail"
directory = "/srv/mailer"
"#;

#[test]
fn generates_supervisor_config() {
    let project = Project::with_tasks(WORKERS);

    project
        .gtask()
        .args(&["worker", "generate", "-g", "app"])
        .passes()
        .stdout_has("Generated 2 worker(s)");

    let conf = project.read("workers.conf");
    assert!(conf.contains("[group:app]"), "{conf}");
    assert!(conf.contains("programs=app-queue,app-mailer"), "{conf}");
    assert!(conf.contains("[program:app-queue]"), "{conf}");
    assert!(
        conf.contains("php artisan queue:work --name=app-queue"),
        "{conf}"
    );
    assert!(conf.contains("user = ops"), "{conf}");
    assert!(conf.contains("user = mail"), "{conf}");
    assert!(conf.contains("directory = /srv/mailer"), "{conf}");
    assert!(conf.contains("QUEUE=\"default\""), "{conf}");
}

#[test]
fn user_flag_applies_to_workers_without_user() {
    let project = Project::with_tasks(WORKERS);

    project
        .gtask()
        .args(&["worker", "generate", "-g", "app", "-u", "deploy"])
        .passes();

    let conf = project.read("workers.conf");
    assert!(conf.contains("user = deploy"), "{conf}");
    assert!(conf.contains("user = mail"), "{conf}");
}

#[test]
fn output_flag_chooses_file() {
    let project = Project::with_tasks(WORKERS).file("out/.keep", "");

    project
        .gtask()
        .args(&["worker", "generate", "-g", "app", "-o", "out/app.conf"])
        .passes()
        .stdout_has("out/app.conf");

    assert!(project.read("out/app.conf").contains("[group:app]"));
}

#[test]
fn missing_output_directory_fails() {
    Project::with_tasks(WORKERS)
        .gtask()
        .args(&["worker", "generate", "-g", "app", "-o", "nowhere/app.conf"])
        .fails()
        .stderr_has("nowhere");
}

#[test]
fn unsupported_format_fails() {
    Project::with_tasks(WORKERS)
        .gtask()
        .args(&["worker", "generate", "-g", "app", "-f", "systemd"])
        .fails()
        .stderr_has("systemd");
}

#[test]
fn group_name_is_required() {
    Project::with_tasks(WORKERS)
        .gtask()
        .args(&["worker", "generate"])
        .fails()
        .stderr_has("--group-name");
}
