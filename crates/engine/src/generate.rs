// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervisor configuration for worker tasks

use crate::error::GenerateError;
use gtask_core::WorkerTask;
use minijinja::{context, Environment};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const SUPERVISOR_TEMPLATE: &str = r#"; Generated by gtask {{ version }}, do not edit
[group:{{ group }}]
programs={{ programs }}
{% for program in workers %}

[program:{{ program.name }}]
directory = {{ program.directory }}
autorestart = true
autostart = true
user = {{ program.user }}
command = {{ program.command }}
environment = {{ program.environment }}
{% endfor %}
"#;

/// Output format of `worker generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Supervisor,
}

impl FromStr for Format {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supervisor" => Ok(Format::Supervisor),
            other => Err(GenerateError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Supervisor => write!(f, "supervisor"),
        }
    }
}

#[derive(Serialize)]
struct Program {
    name: String,
    directory: String,
    user: String,
    command: String,
    environment: String,
}

impl Program {
    fn from_worker(worker: &WorkerTask) -> Self {
        let environment = worker
            .env
            .iter()
            .map(|(key, value)| {
                let value = escape_percent(value)
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"");
                format!("{}=\"{}\"", key, value)
            })
            .collect::<Vec<_>>()
            .join(",");

        Self {
            name: worker.prefixed_name(),
            directory: worker.directory.display().to_string(),
            user: worker.user.clone(),
            command: escape_percent(&worker.command),
            environment,
        }
    }
}

/// supervisord expands `%(name)s` in values, so literal percents are doubled
fn escape_percent(value: &str) -> String {
    value.replace('%', "%%")
}

/// Render the configuration for `workers` in `format`
pub fn render(workers: &[WorkerTask], group: &str, format: Format) -> Result<String, GenerateError> {
    let template = match format {
        Format::Supervisor => SUPERVISOR_TEMPLATE,
    };

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("workers.conf", template)?;

    let programs: Vec<Program> = workers.iter().map(Program::from_worker).collect();
    let names = programs
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let rendered = env.get_template("workers.conf")?.render(context! {
        version => env!("CARGO_PKG_VERSION"),
        group => group,
        programs => names,
        workers => programs,
    })?;
    Ok(rendered)
}

/// Render and write the configuration to `output`
///
/// The parent directory of `output` must already exist.
pub fn generate(
    workers: &[WorkerTask],
    group: &str,
    format: Format,
    output: &Path,
) -> Result<(), GenerateError> {
    let parent = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if !parent.is_dir() {
        return Err(GenerateError::OutputDir(parent.to_path_buf()));
    }

    let rendered = render(workers, group, format)?;
    std::fs::write(output, rendered).map_err(|source| GenerateError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    tracing::info!(
        format = %format,
        group,
        workers = workers.len(),
        output = %output.display(),
        "generated worker configuration"
    );
    Ok(())
}

#[cfg(test)]
#[path = "generate_tests.rs"]
mod tests;
