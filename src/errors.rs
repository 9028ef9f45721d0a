// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ConfigError`]: the task graph or the project configuration is wrong.
//!   Always detected before any action runs.
//! - [`ActionError`]: a single task action failed.
//! - [`TaskGraphError`]: what callers of the runner see; action failures are
//!   wrapped with the name of the task that produced them.

use thiserror::Error;

use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("task '{0}' is already registered")]
    DuplicateTask(TaskName),

    #[error("unknown task '{0}'")]
    UnknownTask(TaskName),

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency {
        task: TaskName,
        dependency: TaskName,
    },

    #[error("cycle detected in task graph involving task '{task}'")]
    Cycle { task: TaskName },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum ActionError {
    /// The style checker reported findings; any finding fails the task.
    #[error("lint reported {findings} finding(s)")]
    LintViolation { findings: usize },

    #[error("command `{command}` exited with status {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum TaskGraphError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("task '{task}' failed: {source}")]
    Task {
        task: TaskName,
        #[source]
        source: ActionError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskGraphError {
    /// Name of the task whose action failed, if this is an action failure.
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            TaskGraphError::Task { task, .. } => Some(task),
            _ => None,
        }
    }

    pub fn is_lint_violation(&self) -> bool {
        matches!(
            self,
            TaskGraphError::Task {
                source: ActionError::LintViolation { .. },
                ..
            }
        )
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, TaskGraphError::Config(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskGraphError>;
