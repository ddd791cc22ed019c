//! Task registry — explicit builder-style registration of install tasks,
//! their dependency declarations, and the capabilities they provide.
//!
//! Registration order is significant: it is the tie-break rule for the
//! scheduler and the default selection rule for capability providers.

use indexmap::IndexMap;

use super::context::SetupContext;
use super::errors::{Result, SetupError};
use super::types::{Task, TaskOutcome};

/// Static mapping from task name to an executable unit, plus the
/// dependency and provider relations. Populated once, read-only afterwards
/// apart from the per-run `changed` flags.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: IndexMap<String, Task>,
    dependencies: IndexMap<String, Vec<String>>,
    providers: IndexMap<String, Vec<String>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. `dependencies` may name concrete tasks or capabilities;
    /// `provides` lists capabilities this task can satisfy. Registering the
    /// same name twice is an error.
    pub fn register<F>(
        &mut self,
        name: &str,
        dependencies: &[&str],
        provides: &[&str],
        run: F,
    ) -> Result<()>
    where
        F: Fn(&mut SetupContext, bool) -> std::result::Result<TaskOutcome, String>
            + Send
            + Sync
            + 'static,
    {
        if self.tasks.contains_key(name) {
            return Err(SetupError::DuplicateTask(name.to_string()));
        }

        self.tasks.insert(
            name.to_string(),
            Task {
                name: name.to_string(),
                run: Box::new(run),
                changed: false,
            },
        );
        self.dependencies.insert(
            name.to_string(),
            dependencies.iter().map(|d| d.to_string()).collect(),
        );
        for capability in provides {
            self.providers
                .entry(capability.to_string())
                .or_default()
                .push(name.to_string());
        }

        Ok(())
    }

    /// Look up a task by name.
    pub fn lookup(&self, name: &str) -> Result<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| SetupError::UnknownTask(name.to_string()))
    }

    pub(crate) fn lookup_mut(&mut self, name: &str) -> Result<&mut Task> {
        self.tasks
            .get_mut(name)
            .ok_or_else(|| SetupError::UnknownTask(name.to_string()))
    }

    /// Clear every task's `changed` flag. Idempotent; called before each
    /// run so skip decisions are not influenced by a previous run.
    pub fn reset_changes(&mut self) {
        for task in self.tasks.values_mut() {
            task.changed = false;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Declared requirements of a task (concrete names or capabilities).
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.dependencies
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Registered providers of a capability, in registration order.
    pub fn providers_of(&self, capability: &str) -> Option<&[String]> {
        self.providers.get(capability).map(Vec::as_slice)
    }

    /// Tasks flagged as changed in the current run.
    pub fn changed_tasks(&self) -> Vec<&str> {
        self.tasks
            .values()
            .filter(|t| t.changed)
            .map(|t| t.name.as_str())
            .collect()
    }
}
