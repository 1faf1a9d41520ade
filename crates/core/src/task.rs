// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled task model and its execution

use crate::condition::{self, ExpressionError};
use crate::config::ScheduledConfig;
use crate::env::{self, EnvVars, DIR_VAR, ID_VAR};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::Instrument;

/// Outcome of one execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Succeed,
    Failed,
    Skipped,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Succeed => "succeed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Errors from starting or running a task's process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("command is empty")]
    EmptyCommand,
    #[error("executable `{0}` not found")]
    NotFound(String),
    #[error("working directory `{}` does not exist", .0.display())]
    Directory(PathBuf),
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("process {0}")]
    Exit(ExitStatus),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a task run failed
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to evaluate expression for `{id}`: {source}")]
    Expression {
        id: String,
        #[source]
        source: ExpressionError,
    },
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Result of one execution; `error` is set iff `status` is `Failed`
#[derive(Debug)]
pub struct TaskResult {
    /// Id of the originating task
    pub task_id: String,
    pub status: TaskStatus,
    pub error: Option<TaskError>,
    /// Combined stdout and stderr, in arrival order
    pub output: Vec<u8>,
    pub start_at: DateTime<Local>,
    pub finish_at: DateTime<Local>,
}

impl TaskResult {
    fn start(task_id: &str) -> Self {
        let now = Local::now();
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Pending,
            error: None,
            output: Vec::new(),
            start_at: now,
            finish_at: now,
        }
    }

    fn finish(mut self, outcome: Result<(), TaskError>) -> Self {
        self.finish_at = Local::now().max(self.start_at);
        match outcome {
            Ok(()) => self.status = TaskStatus::Succeed,
            Err(e) => {
                self.status = TaskStatus::Failed;
                self.error = Some(e);
            }
        }
        self
    }

    /// Wall time between start and finish
    pub fn duration(&self) -> Duration {
        (self.finish_at - self.start_at).to_std().unwrap_or_default()
    }
}

/// Inputs shared by every task during preparation
#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    /// Directory used by tasks that do not declare one
    pub working_dir: PathBuf,
    /// Caller-injected variables, e.g. from `-e KEY=value`
    pub env_overrides: EnvVars,
}

/// A fully prepared schedulable unit
#[derive(Debug)]
pub struct ScheduledTask {
    pub id: String,
    pub cron_expr: String,
    pub command: String,
    /// Guard expression; empty means always run
    pub expression: String,
    pub directory: PathBuf,
    /// Resolved environment, identity variables included
    pub env: EnvVars,
    span: tracing::Span,
    latest_result: Mutex<Option<Arc<TaskResult>>>,
}

impl ScheduledTask {
    /// Build a ready-to-run task from its declaration
    pub fn prepare(config: &ScheduledConfig, options: &PrepareOptions) -> Self {
        let directory = config
            .directory
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| options.working_dir.clone());

        let identity = EnvVars::from([
            (ID_VAR.to_string(), config.id.clone()),
            (DIR_VAR.to_string(), directory.display().to_string()),
        ]);

        Self {
            id: config.id.clone(),
            cron_expr: config.expr.clone(),
            command: config.command.clone(),
            expression: config.expression.clone().unwrap_or_default(),
            env: env::resolve(&config.envs, &options.env_overrides, &identity),
            span: tracing::debug_span!("task", task_id = %config.id),
            directory,
            latest_result: Mutex::new(None),
        }
    }

    /// Most recent result, if the task ever ran
    pub fn latest_result(&self) -> Option<Arc<TaskResult>> {
        self.latest_result
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Run the task once and record the result as the latest one
    pub async fn execute(&self) -> Arc<TaskResult> {
        let result = Arc::new(self.run().instrument(self.span.clone()).await);
        *self.latest_result.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&result));
        result
    }

    async fn run(&self) -> TaskResult {
        let mut result = TaskResult::start(&self.id);

        match condition::evaluate(&self.expression, &self.env) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(expression = %self.expression, "guard is false, skipping");
                result.status = TaskStatus::Skipped;
                return result;
            }
            Err(source) => {
                let error = TaskError::Expression {
                    id: self.id.clone(),
                    source,
                };
                tracing::warn!(error = %error, "guard evaluation failed");
                return result.finish(Err(error));
            }
        }

        let command = env::expand(&self.command, &self.env);
        tracing::debug!(
            task_id = %self.id,
            command = %command,
            directory = %self.directory.display(),
            "running task"
        );

        let mut output = Vec::new();
        let outcome = spawn_and_wait(&command, &self.directory, &self.env, &mut output).await;
        result.output = output;
        let result = result.finish(outcome.map_err(TaskError::from));

        tracing::debug!(
            task_id = %self.id,
            status = %result.status,
            elapsed = %humantime::format_duration(result.duration()),
            "task finished"
        );
        result
    }
}

/// Prepare every declared task, in declaration order
pub fn prepare_scheduled_tasks(
    configs: &[ScheduledConfig],
    options: &PrepareOptions,
) -> Vec<Arc<ScheduledTask>> {
    configs
        .iter()
        .map(|config| Arc::new(ScheduledTask::prepare(config, options)))
        .collect()
}

async fn spawn_and_wait(
    command: &str,
    directory: &Path,
    env: &EnvVars,
    output: &mut Vec<u8>,
) -> Result<(), ProcessError> {
    let argv = crate::command::split(command);
    let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;

    if !directory.is_dir() {
        return Err(ProcessError::Directory(directory.to_path_buf()));
    }

    let mut child = tokio::process::Command::new(program)
        .args(args)
        .current_dir(directory)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ProcessError::NotFound(program.clone()),
            _ => ProcessError::Spawn {
                program: program.clone(),
                source,
            },
        })?;

    let sink = Mutex::new(Vec::new());
    let (stdout, stderr) = tokio::join!(
        pump(child.stdout.take(), &sink),
        pump(child.stderr.take(), &sink)
    );
    let status = child.wait().await;
    *output = sink.into_inner().unwrap_or_else(|e| e.into_inner());

    stdout?;
    stderr?;
    let status = status?;
    if !status.success() {
        return Err(ProcessError::Exit(status));
    }
    Ok(())
}

/// Copy a child stream into the shared buffer as chunks arrive
async fn pump<R>(reader: Option<R>, sink: &Mutex<Vec<u8>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(());
    };
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        sink.lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(&buf[..n]);
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
