// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gtask-core: building blocks of the gtask scheduler
//!
//! This crate provides:
//! - The task model and its `execute` operation
//! - Environment resolution, guard expressions and command splitting
//! - Cron due-checks and reference-time computation
//! - Task file loading and validation
//! - A clock abstraction with a controllable fake for tests

pub mod clock;
pub mod command;
pub mod condition;
pub mod config;
pub mod due;
pub mod env;
pub mod task;
pub mod worker;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use condition::ExpressionError;
pub use config::{ConfigError, ScheduledConfig, TaskFile, WorkerConfig};
pub use due::{current_time, is_due, CronSchedule, ScheduleError};
pub use env::EnvVars;
pub use task::{
    prepare_scheduled_tasks, PrepareOptions, ProcessError, ScheduledTask, TaskError, TaskResult,
    TaskStatus,
};
pub use worker::{prepare_worker_tasks, WorkerPrepareOptions, WorkerTask};
