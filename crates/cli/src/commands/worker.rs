// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gtask worker` - Worker configuration commands

use super::{env_overrides, load_task_file, parse_key_val, working_dir};
use anyhow::Result;
use clap::{Args, Subcommand};
use gtask_core::{prepare_worker_tasks, WorkerPrepareOptions};
use gtask_engine::{generate, Format};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// Generate a process supervisor configuration for the workers
    Generate(GenerateArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Group the programs belong to
    #[arg(short = 'g', long = "group-name")]
    pub group: String,

    /// Output file (default: ./workers.conf)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, default_value = "supervisor")]
    pub format: String,

    /// User for workers that do not declare one (default: $USER)
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Directory for workers that do not declare one (default: current directory)
    #[arg(short = 'w', long)]
    pub working_dir: Option<PathBuf>,

    /// Injected variables (KEY=value), repeatable
    #[arg(short = 'e', long = "env", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,
}

pub fn handle(args: WorkerArgs, config: &Path) -> Result<()> {
    match args.command {
        WorkerCommand::Generate(args) => generate_config(args, config),
    }
}

fn generate_config(args: GenerateArgs, config: &Path) -> Result<()> {
    let format: Format = args.format.parse()?;
    let file = load_task_file(config)?;

    let working_dir = working_dir(args.working_dir)?;
    let output = match args.output {
        Some(output) => output,
        None => std::env::current_dir()?.join("workers.conf"),
    };
    let user = args
        .user
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_default();

    let workers = prepare_worker_tasks(
        &file.workers,
        &WorkerPrepareOptions {
            group: args.group.clone(),
            user,
            working_dir,
            env_overrides: env_overrides(args.env),
        },
    );
    generate::generate(&workers, &args.group, format, &output)?;

    println!("Generated {} worker(s) in {}", workers.len(), output.display());
    Ok(())
}
