//! Task result types stored in the result cache

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (module, task) pair a result is cached under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskScope {
    module: String,
    task: String,
}

impl TaskScope {
    /// Create a scope, validating both names
    pub fn new(module: impl Into<String>, task: impl Into<String>) -> Result<Self> {
        let module = module.into();
        let task = task.into();
        validate_name(&module, "module name")?;
        validate_name(&task, "task name")?;
        Ok(Self { module, task })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn task(&self) -> &str {
        &self.task
    }
}

impl fmt::Display for TaskScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.task)
    }
}

fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::configuration(format!("{what} cannot be empty")));
    }
    let valid = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
    // "--" is the key separator
    if !valid || name.contains("--") {
        return Err(Error::configuration(format!(
            "{what} '{name}' must contain only alphanumeric characters, underscores, single hyphens, and dots"
        )));
    }
    Ok(())
}

/// Outcome of one task execution, cached against the version it ran on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub scope: TaskScope,
    pub version: String,
    pub command: Vec<String>,
    pub output: String,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl TaskResult {
    /// Wall-clock time the task took; zero when the clock went backwards
    pub fn duration(&self) -> std::time::Duration {
        (self.completed_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}
