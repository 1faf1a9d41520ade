// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gtask validate` - Check the task file

use super::load_task_file;
use anyhow::Result;
use std::path::Path;

pub fn handle(config: &Path) -> Result<()> {
    let file = load_task_file(config)?;
    println!(
        "{} is valid: {} scheduled task(s), {} worker(s)",
        config.display(),
        file.scheduled.len(),
        file.workers.len()
    );
    Ok(())
}
