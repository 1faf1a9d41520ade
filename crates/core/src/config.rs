// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task file loading and validation
//!
//! The task file is TOML with two arrays of tables, `[[scheduled]]` and
//! `[[workers]]`. Every field defaults so that missing values surface as
//! validation errors rather than as opaque parse failures.

use crate::condition::Expr;
use crate::due::CronSchedule;
use crate::env::EnvVars;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default task file name, looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "tasks.toml";

/// Characters that may not appear in a task id
const FORBIDDEN_ID_CHARS: &[char] = &['!', '@', '#', '$', ' '];

/// Errors from loading a task file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// Declaration of a cron-driven task
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduledConfig {
    pub id: String,
    /// Cron expression, alias or `@every <duration>`
    pub expr: String,
    pub command: String,
    pub directory: Option<PathBuf>,
    /// Guard expression
    pub expression: Option<String>,
    pub envs: EnvVars,
}

/// Declaration of a long-running worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    pub id: String,
    pub command: String,
    pub user: Option<String>,
    pub directory: Option<PathBuf>,
    pub envs: EnvVars,
}

/// Parsed task file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskFile {
    pub scheduled: Vec<ScheduledConfig>,
    pub workers: Vec<WorkerConfig>,
}

impl TaskFile {
    /// Parse TOML content without validating it
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read, parse and validate a task file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::parse(&content)?;
        file.validate()?;
        tracing::debug!(
            path = %path.display(),
            scheduled = file.scheduled.len(),
            workers = file.workers.len(),
            "loaded task file"
        );
        Ok(file)
    }

    /// Check every declaration, collecting all problems
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for (index, task) in self.scheduled.iter().enumerate() {
            check_id(Section::Scheduled, index, &task.id, &mut seen, &mut errors);
            if task.command.trim().is_empty() {
                errors.push(ValidationError::MissingField {
                    section: Section::Scheduled,
                    index,
                    field: "command",
                });
            }
            if task.expr.trim().is_empty() {
                errors.push(ValidationError::MissingField {
                    section: Section::Scheduled,
                    index,
                    field: "expr",
                });
            } else if let Err(e) = task.expr.parse::<CronSchedule>() {
                errors.push(ValidationError::InvalidCron {
                    id: task.id.clone(),
                    message: e.to_string(),
                });
            }
            if let Some(expression) = task.expression.as_deref().filter(|e| !e.trim().is_empty()) {
                if let Err(e) = Expr::parse(expression) {
                    errors.push(ValidationError::InvalidExpression {
                        id: task.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for (index, worker) in self.workers.iter().enumerate() {
            check_id(Section::Workers, index, &worker.id, &mut seen, &mut errors);
            if worker.command.trim().is_empty() {
                errors.push(ValidationError::MissingField {
                    section: Section::Workers,
                    index,
                    field: "command",
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

fn check_id(
    section: Section,
    index: usize,
    id: &str,
    seen: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    if id.is_empty() {
        errors.push(ValidationError::MissingField {
            section,
            index,
            field: "id",
        });
    } else if id.contains(FORBIDDEN_ID_CHARS) {
        errors.push(ValidationError::InvalidId {
            section,
            id: id.to_string(),
        });
    } else if !seen.insert(id.to_string()) {
        errors.push(ValidationError::DuplicateId {
            section,
            id: id.to_string(),
        });
    }
}

/// Task file section a problem was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Scheduled,
    Workers,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Scheduled => write!(f, "scheduled"),
            Section::Workers => write!(f, "workers"),
        }
    }
}

/// A single validation problem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{section}[{index}]: missing required field `{field}`")]
    MissingField {
        section: Section,
        index: usize,
        field: &'static str,
    },
    #[error("{section}: id `{id}` contains a forbidden character (one of `! @ # $` or space)")]
    InvalidId { section: Section, id: String },
    #[error("{section}: id `{id}` is declared more than once")]
    DuplicateId { section: Section, id: String },
    #[error("scheduled `{id}`: {message}")]
    InvalidCron { id: String, message: String },
    #[error("scheduled `{id}`: invalid guard expression: {message}")]
    InvalidExpression { id: String, message: String },
}

/// Every problem found in a task file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "task file validation failed with {} error(s):",
            self.errors.len()
        )?;
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "  {}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
