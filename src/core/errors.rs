//! Error taxonomy for setup orchestration.
//!
//! Graph-construction errors (`UnknownTask`, `UnresolvedDependency`,
//! `InvalidDependency`, `CyclicDependency`, `UnknownProvider`) abort before
//! any task runs. `TaskFailed` aborts the remaining sequence and suppresses
//! the cache flush.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for setup operations.
pub type Result<T> = std::result::Result<T, SetupError>;

/// Errors that can occur while building the task graph, running tasks, or
/// touching the environment and cache files.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A referenced task name has no registry entry.
    #[error("unknown task '{0}'")]
    UnknownTask(String),

    /// A task was registered twice under the same name.
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    /// A requirement resolves to neither a task nor a provided capability.
    #[error("task '{task}' requires '{requirement}', which is neither a registered task nor a provided capability")]
    UnresolvedDependency { task: String, requirement: String },

    /// A task declares a dependency on itself.
    #[error("task '{0}' depends on itself")]
    InvalidDependency(String),

    /// The dependency relation contains a cycle.
    #[error("dependency cycle involving: {}", .tasks.join(", "))]
    CyclicDependency { tasks: Vec<String> },

    /// A provider override names a task that does not provide the capability.
    #[error("'{task}' is not a registered provider of capability '{capability}'")]
    UnknownProvider { capability: String, task: String },

    /// An individual task's callable failed; remaining tasks were not run.
    #[error("task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    /// The cache file is malformed.
    #[error("cache file {}: {reason}", .path.display())]
    Cache { path: PathBuf, reason: String },

    /// The environment file is missing or malformed.
    #[error("environment file {}: {reason}", .path.display())]
    Environment { path: PathBuf, reason: String },

    /// Filesystem error with the offending path.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SetupError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
