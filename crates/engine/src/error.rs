// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use gtask_core::ScheduleError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the tick scheduler before or while it runs
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("failed to install signal handler: {0}")]
    Signal(#[from] std::io::Error),
}

/// Errors from rendering a supervisor configuration
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("unsupported format `{0}`")]
    UnsupportedFormat(String),
    #[error("output directory `{}` does not exist", .0.display())]
    OutputDir(PathBuf),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}
