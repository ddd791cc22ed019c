//! Core types: tasks, task outcomes, run options and reports, the task
//! graph, and the progress sink contract.

use std::fmt;
use std::time::Duration;

use super::context::SetupContext;

/// A task callable: side-effecting unit of work receiving the shared
/// context and the progress flag. Failures are free-form reasons; the run
/// loop wraps them into a structured error.
pub type TaskFn =
    Box<dyn Fn(&mut SetupContext, bool) -> std::result::Result<TaskOutcome, String> + Send + Sync>;

/// What a task did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The target state was modified in this run.
    Changed,
    /// The target was already satisfied (cache skip).
    Unchanged,
}

/// A named, idempotent-intending unit of installation work.
pub struct Task {
    /// Unique task name.
    pub name: String,
    /// The callable invoked by the run loop, at most once per run.
    pub run: TaskFn,
    /// Whether this task's target was modified in the current run.
    /// Cleared by `TaskRegistry::reset_changes` before each run.
    pub changed: bool,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}

/// Per-task state during a run. `Pending` is initial; `Succeeded` and
/// `Failed` are terminal. Cache skips fold into `Succeeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// The resolved dependency graph: vertices are task names, edges run from
/// requirement to dependent. Both sets are in deterministic order —
/// vertices by registration, edges by dependent then declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGraph {
    pub vertices: Vec<String>,
    pub edges: Vec<(String, String)>,
}

/// Options for one run of the install loop.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Passed through to every task; also enables the progress sink.
    pub progress: bool,
    /// Persist the cache after a fully successful run.
    pub write_cache: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            progress: false,
            write_cache: true,
        }
    }
}

/// Result of a fully successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The execution order that was walked.
    pub order: Vec<String>,
    /// Tasks that reported `Changed`.
    pub changed: Vec<String>,
    pub total_duration: Duration,
}

impl RunReport {
    /// Number of tasks that were already satisfied.
    pub fn unchanged_count(&self) -> usize {
        self.order.len() - self.changed.len()
    }
}

/// Observational sink receiving one "unit complete" signal per task.
/// The total equals the number of tasks in the registry.
pub trait ProgressSink {
    fn begin(&mut self, total: usize) {
        let _ = total;
    }
    fn advance(&mut self, task: &str) {
        let _ = task;
    }
    fn finish(&mut self) {}
}

/// Sink that reports nothing.
pub struct NoProgress;

impl ProgressSink for NoProgress {}
