// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gtask schedule` - Run scheduled tasks once or on a tick loop

use super::{env_overrides, load_task_file, parse_key_val, working_dir};
use crate::error::CliError;
use anyhow::Result;
use clap::{Args, Subcommand};
use gtask_core::{
    current_time, prepare_scheduled_tasks, Clock, PrepareOptions, ScheduledTask, SystemClock,
    TaskFile,
};
use gtask_engine::{Orchestrator, RunOptions, SchedulerConfig, TickScheduler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Run the tasks due now, once
    Run(RunArgs),
    /// Run due tasks on every tick until stopped
    Start(StartArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Comma-separated task ids to consider (default: all)
    #[arg(value_delimiter = ',')]
    pub tasks: Vec<String>,

    /// Directory for tasks that do not declare one (default: current directory)
    #[arg(short = 'w', long)]
    pub working_dir: Option<PathBuf>,

    /// Time zone used to match cron expressions (e.g. Europe/Paris)
    #[arg(short = 't', long, default_value = "")]
    pub timezone: String,

    /// Do not print task results
    #[arg(long)]
    pub no_result_print: bool,

    /// Append task results to this file
    #[arg(long)]
    pub result_path: Option<PathBuf>,

    /// Ignore cron expressions and run every selected task
    #[arg(long)]
    pub force: bool,

    /// Injected variables (KEY=value), repeatable
    #[arg(short = 'e', long = "env", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,
}

#[derive(Args)]
pub struct StartArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Interval between ticks, in whole minutes (e.g. 1m, 5m, 1h)
    #[arg(long, default_value = "5m", value_parser = parse_tick)]
    pub tick: u32,
}

pub async fn handle(args: ScheduleArgs, config: &Path) -> Result<()> {
    match args.command {
        ScheduleCommand::Run(args) => run(args, config).await,
        ScheduleCommand::Start(args) => start(args, config).await,
    }
}

async fn run(args: RunArgs, config: &Path) -> Result<()> {
    let file = load_task_file(config)?;
    let (tasks, options) = prepare(&file, &args)?;

    let reference = current_time(SystemClock.now(), &args.timezone)?;
    let results = gtask_engine::run(&tasks, reference, &options).await;
    tracing::debug!(completed = results.len(), "run finished");
    Ok(())
}

async fn start(args: StartArgs, config: &Path) -> Result<()> {
    let file = load_task_file(config)?;
    let (tasks, options) = prepare(&file, &args.run)?;

    // Surface a bad zone now rather than at the first tick
    current_time(SystemClock.now(), &args.run.timezone)?;

    let scheduler = TickScheduler::new(
        SystemClock,
        Orchestrator::new(tasks, options),
        SchedulerConfig {
            tick: args.tick,
            timezone: args.run.timezone.clone(),
            ..Default::default()
        },
    );
    scheduler.start(CancellationToken::new()).await?;
    Ok(())
}

fn prepare(file: &TaskFile, args: &RunArgs) -> Result<(Vec<Arc<ScheduledTask>>, RunOptions)> {
    let known: Vec<String> = file.scheduled.iter().map(|t| t.id.clone()).collect();
    let unknown: Vec<String> = args
        .tasks
        .iter()
        .filter(|id| !known.contains(id))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(CliError::unknown_tasks(&unknown, &known).into());
    }

    let tasks = prepare_scheduled_tasks(
        &file.scheduled,
        &PrepareOptions {
            working_dir: working_dir(args.working_dir.clone())?,
            env_overrides: env_overrides(args.env.clone()),
        },
    );
    let options = RunOptions {
        task_filter: args.tasks.clone(),
        force: args.force,
        suppress_print: args.no_result_print,
        result_path: args.result_path.clone(),
    };
    Ok((tasks, options))
}

/// Parse `--tick`: a positive, whole number of minutes
pub(crate) fn parse_tick(s: &str) -> Result<u32, String> {
    let duration: Duration = humantime::parse_duration(s).map_err(|e| e.to_string())?;
    if duration.is_zero() {
        return Err("tick must be greater than zero".to_string());
    }
    if duration.as_secs() % 60 != 0 || duration.subsec_nanos() != 0 {
        return Err(format!("tick `{s}` must be a whole number of minutes"));
    }
    u32::try_from(duration.as_secs() / 60).map_err(|_| format!("tick `{s}` is too large"))
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
