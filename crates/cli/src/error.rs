// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Each error says what went wrong, why it might have happened and how to
//! fix it.

use gtask_core::config::ValidationErrors;
use gtask_core::ConfigError;
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Builders for the common failures
impl CliError {
    /// A task file that could not be loaded
    pub fn config(path: &Path, err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => {
                CliError::new(format!("cannot read task file {}", path.display()))
                    .with_context(err.to_string())
                    .with_suggestion("Create a tasks.toml in the current directory")
                    .with_suggestion("Point to another file with: gtask -c <FILE> ...")
                    .with_source(err)
            }
            ConfigError::Toml(ref inner) => {
                CliError::new(format!("task file {} is not valid TOML", path.display()))
                    .with_context(inner.to_string())
                    .with_source(err)
            }
            ConfigError::Invalid(errors) => Self::invalid_config(path, errors),
        }
    }

    /// A task file that parsed but failed validation
    pub fn invalid_config(path: &Path, errors: ValidationErrors) -> Self {
        let mut err = CliError::new(format!(
            "task file {} has {} error(s)",
            path.display(),
            errors.errors.len()
        ));
        for issue in &errors.errors {
            err = err.with_context(issue.to_string());
        }
        err.with_suggestion("Fix the listed issues, then check with: gtask validate")
            .with_source(errors)
    }

    /// Filter ids that match no scheduled task
    pub fn unknown_tasks(unknown: &[String], known: &[String]) -> Self {
        let err = CliError::new(format!("unknown task id(s): {}", unknown.join(", ")));
        if known.is_empty() {
            err.with_context("The task file declares no scheduled task")
        } else {
            err.with_context(format!("Declared scheduled tasks: {}", known.join(", ")))
                .with_suggestion("Check the spelling of the comma-separated filter")
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
