// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable resolution
//!
//! Precedence, lowest to highest:
//! 1. variables declared on the task (keys upper-cased)
//! 2. overrides injected by the caller (e.g. `-e KEY=value`)
//! 3. identity variables (`GTASK_*`), which can never be shadowed
//!
//! Values are then expanded once against the merged set, falling back to
//! the process environment.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Flat environment mapping, ordered by key for stable output
pub type EnvVars = BTreeMap<String, String>;

/// Task identifier
pub const ID_VAR: &str = "GTASK_ID";
/// Resolved working directory
pub const DIR_VAR: &str = "GTASK_DIR";
/// Worker group name
pub const GROUP_NAME_VAR: &str = "GTASK_GROUP_NAME";
/// Worker user
pub const USER_VAR: &str = "GTASK_USER";
/// Worker `<group>-<id>` name
pub const PREFIXED_NAME_VAR: &str = "GTASK_PREFIXED_NAME";

// Matches ${NAME} and $NAME - constant valid pattern
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("constant regex pattern is valid")
});

/// Rewrite every key to upper case; on collision the last key (in key order) wins
pub fn to_upper_keys(vars: EnvVars) -> EnvVars {
    vars.into_iter()
        .map(|(key, value)| (key.to_uppercase(), value))
        .collect()
}

/// Merge `overrides` into `base`, overrides taking precedence
pub fn merge(mut base: EnvVars, overrides: &EnvVars) -> EnvVars {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Look a name up in `vars`, then in the process environment
pub fn lookup(vars: &EnvVars, name: &str) -> String {
    vars.get(name)
        .cloned()
        .unwrap_or_else(|| std::env::var(name).unwrap_or_default())
}

/// Expand `${NAME}` and `$NAME` references in a single pass
///
/// Unresolved names expand to the empty string. Substituted values are not
/// expanded again.
pub fn expand(template: &str, vars: &EnvVars) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            lookup(vars, name)
        })
        .into_owned()
}

/// Build the final environment of a task
///
/// Re-resolving the same inputs always yields the same mapping.
pub fn resolve(task_env: &EnvVars, overrides: &EnvVars, identity: &EnvVars) -> EnvVars {
    let merged = merge(to_upper_keys(task_env.clone()), &to_upper_keys(overrides.clone()));
    let merged = merge(merged, identity);

    merged
        .iter()
        .map(|(key, value)| (key.clone(), expand(value, &merged)))
        .collect()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
