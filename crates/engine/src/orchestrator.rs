// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-tick run of the due tasks
//!
//! Due tasks are fanned out on the runtime and joined before returning, so
//! two runs never overlap when called from the tick loop.

use crate::report;
use crate::scheduler::TickHandler;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use gtask_core::{is_due, ScheduledTask, TaskResult};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

/// How a run selects and reports tasks
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only these ids run when non-empty
    pub task_filter: Vec<String>,
    /// Run every selected task regardless of its cron expression
    pub force: bool,
    /// Do not print result blocks to stdout
    pub suppress_print: bool,
    /// Append result blocks to this file
    pub result_path: Option<PathBuf>,
}

impl RunOptions {
    fn selects(&self, id: &str) -> bool {
        self.task_filter.is_empty() || self.task_filter.iter().any(|f| f == id)
    }
}

/// Execute every selected and due task concurrently, then report
///
/// Results come back in completion order. Nothing here fails the run:
/// due-check errors count as "not due", execution failures live in the
/// results, and report write errors are only logged.
pub async fn run(
    tasks: &[Arc<ScheduledTask>],
    reference: DateTime<FixedOffset>,
    options: &RunOptions,
) -> Vec<Arc<TaskResult>> {
    let results = Arc::new(Mutex::new(Vec::new()));
    let mut running = JoinSet::new();

    for task in tasks {
        if !options.selects(&task.id) {
            tracing::info!(task_id = %task.id, "task not selected by filter");
            continue;
        }

        let due = match is_due(&task.cron_expr, &reference) {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(task_id = %task.id, error = %e, "failed to check if task is due");
                false
            }
        };
        if !due && !options.force {
            tracing::debug!(task_id = %task.id, "task must not run");
            continue;
        }

        tracing::info!(task_id = %task.id, forced = !due, "task will run");
        let task = Arc::clone(task);
        let results = Arc::clone(&results);
        running.spawn(async move {
            let result = task.execute().await;
            results
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(result);
        });
    }

    while let Some(joined) = running.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "task execution aborted");
        }
    }

    let results = std::mem::take(&mut *results.lock().unwrap_or_else(|e| e.into_inner()));
    for result in &results {
        publish(result, options);
    }
    results
}

fn publish(result: &TaskResult, options: &RunOptions) {
    let block = report::render(result);

    if !options.suppress_print {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(block.as_bytes()).and_then(|_| stdout.flush()) {
            tracing::error!(task_id = %result.task_id, error = %e, "failed to print result");
        }
    }

    if let Some(path) = &options.result_path {
        if let Err(e) = report::append(path, &block) {
            tracing::error!(
                task_id = %result.task_id,
                path = %path.display(),
                error = %e,
                "failed to write result log"
            );
        }
    }
}

/// Tick handler running the prepared task set
pub struct Orchestrator {
    tasks: Vec<Arc<ScheduledTask>>,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(tasks: Vec<Arc<ScheduledTask>>, options: RunOptions) -> Self {
        Self { tasks, options }
    }

    pub fn tasks(&self) -> &[Arc<ScheduledTask>] {
        &self.tasks
    }
}

#[async_trait]
impl TickHandler for Orchestrator {
    async fn on_tick(&self, reference: DateTime<FixedOffset>) {
        let results = run(&self.tasks, reference, &self.options).await;
        tracing::debug!(reference = %reference, completed = results.len(), "tick done");
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
