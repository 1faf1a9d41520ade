// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running worker declarations
//!
//! Workers are never executed here. They are rendered into a process
//! supervisor configuration, so preparation only resolves their fields.

use crate::config::WorkerConfig;
use crate::env::{self, EnvVars, DIR_VAR, GROUP_NAME_VAR, ID_VAR, PREFIXED_NAME_VAR, USER_VAR};
use std::path::PathBuf;

/// Inputs shared by every worker during preparation
#[derive(Debug, Clone, Default)]
pub struct WorkerPrepareOptions {
    pub group: String,
    /// User for workers that do not declare one
    pub user: String,
    /// Directory for workers that do not declare one
    pub working_dir: PathBuf,
    pub env_overrides: EnvVars,
}

/// A fully prepared worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerTask {
    pub id: String,
    pub group: String,
    pub user: String,
    /// Command with variables expanded
    pub command: String,
    pub directory: PathBuf,
    pub env: EnvVars,
}

impl WorkerTask {
    pub fn prepare(config: &WorkerConfig, options: &WorkerPrepareOptions) -> Self {
        let user = config
            .user
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| options.user.clone());
        let directory = config
            .directory
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| options.working_dir.clone());
        let prefixed_name = prefixed_name(&options.group, &config.id);

        let identity = EnvVars::from([
            (ID_VAR.to_string(), config.id.clone()),
            (DIR_VAR.to_string(), directory.display().to_string()),
            (GROUP_NAME_VAR.to_string(), options.group.clone()),
            (USER_VAR.to_string(), user.clone()),
            (PREFIXED_NAME_VAR.to_string(), prefixed_name),
        ]);
        let env = env::resolve(&config.envs, &options.env_overrides, &identity);

        Self {
            id: config.id.clone(),
            group: options.group.clone(),
            user,
            command: env::expand(&config.command, &env),
            directory,
            env,
        }
    }

    /// `<group>-<id>`, the stable external name of the worker
    pub fn prefixed_name(&self) -> String {
        prefixed_name(&self.group, &self.id)
    }
}

fn prefixed_name(group: &str, id: &str) -> String {
    format!("{}-{}", group, id)
}

/// Prepare every declared worker, in declaration order
pub fn prepare_worker_tasks(
    configs: &[WorkerConfig],
    options: &WorkerPrepareOptions,
) -> Vec<WorkerTask> {
    configs
        .iter()
        .map(|config| WorkerTask::prepare(config, options))
        .collect()
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
