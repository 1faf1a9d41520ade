// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gtask execution engine

mod error;
pub mod generate;
mod orchestrator;
pub mod report;
mod scheduler;

pub use error::{GenerateError, SchedulerError};
pub use generate::Format;
pub use orchestrator::{run, Orchestrator, RunOptions};
pub use scheduler::{SchedulerConfig, TickHandler, TickScheduler};
