// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod schedule;
pub mod validate;
pub mod worker;

use crate::error::CliError;
use gtask_core::{EnvVars, TaskFile};
use std::path::{Path, PathBuf};

/// Parse a `KEY=value` pair
pub(crate) fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    let key = &s[..pos];
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{s}`"));
    }
    Ok((key.to_string(), s[pos + 1..].to_string()))
}

/// Collect `-e` pairs; a repeated key keeps its last value
pub(crate) fn env_overrides(pairs: Vec<(String, String)>) -> EnvVars {
    pairs.into_iter().collect()
}

/// Load and validate the task file, with user-facing errors
pub(crate) fn load_task_file(path: &Path) -> Result<TaskFile, CliError> {
    TaskFile::load(path).map_err(|e| CliError::config(path, e))
}

/// `-w` when given, else the current directory
pub(crate) fn working_dir(dir: Option<PathBuf>) -> std::io::Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir(),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
