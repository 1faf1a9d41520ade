// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result blocks, printed to stdout and appended to the result log

use gtask_core::TaskResult;
use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::Path;

const SEPARATOR: &str = "====================";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render one result block
pub fn render(result: &TaskResult) -> String {
    let mut block = String::new();
    block.push_str(SEPARATOR);
    block.push('\n');
    block.push_str(&format!(
        "Task {} finish with status '{}'\n",
        result.task_id, result.status
    ));
    block.push_str(&format!(
        "Start at {}, finish at {} ({})\n",
        result.start_at.format(TIMESTAMP_FORMAT),
        result.finish_at.format(TIMESTAMP_FORMAT),
        humantime::format_duration(result.duration())
    ));
    if !result.output.is_empty() {
        let output = String::from_utf8_lossy(&result.output);
        block.push_str("output:\n");
        // The block ends the output with exactly one newline
        block.push_str(output.strip_suffix('\n').unwrap_or(&*output));
        block.push('\n');
    }
    if let Some(error) = &result.error {
        block.push_str(&format!("Due to the following error: {}\n", error));
    }
    block.push_str(SEPARATOR);
    block.push('\n');
    block
}

/// Append a rendered block to `path`, creating missing parent directories
pub fn append(path: &Path, block: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            DirBuilder::new()
                .recursive(true)
                .mode(0o755)
                .create(parent)?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o644)
        .open(path)?;
    file.write_all(block.as_bytes())
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
