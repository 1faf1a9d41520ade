// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gtask - cron-driven task scheduler

mod commands;
mod error;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{schedule, validate, worker};
use error::CliError;
use gtask_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "gtask",
    version,
    about = "gtask - run scheduled tasks and generate worker configurations"
)]
struct Cli {
    /// Task file
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(short = 'l', long, global = true, default_value = "info")]
    level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scheduled task commands
    Schedule(schedule::ScheduleArgs),
    /// Worker commands
    Worker(worker::WorkerArgs),
    /// Validate the task file
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(&cli.level) {
        eprintln!("error: invalid log level `{}`: {e}", cli.level);
        return ExitCode::FAILURE;
    }

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CliError>() {
                Some(cli_err) => eprint!("{cli_err}"),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Schedule(args) => schedule::handle(args, &cli.config).await,
        Commands::Worker(args) => worker::handle(args, &cli.config),
        Commands::Validate => validate::handle(&cli.config),
    }
}
