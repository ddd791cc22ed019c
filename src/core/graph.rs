//! Dependency graph construction — resolves each declared requirement to a
//! concrete task, expanding capability names through the provider map.
//!
//! Provider selection is deterministic: the first-registered provider wins
//! unless a `provider.<capability>` configuration override names another
//! registered provider.

use indexmap::IndexMap;
use std::collections::HashSet;

use super::errors::{Result, SetupError};
use super::registry::TaskRegistry;
use super::types::TaskGraph;

/// Build the task graph from the registry. Edges run from requirement to
/// dependent; the result is simple (no self-loops, no duplicate edges).
pub fn build(registry: &TaskRegistry, overrides: &IndexMap<String, String>) -> Result<TaskGraph> {
    let vertices: Vec<String> = registry.names().map(str::to_string).collect();
    let mut edges: Vec<(String, String)> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for task in &vertices {
        for requirement in registry.dependencies_of(task) {
            if requirement == task {
                return Err(SetupError::InvalidDependency(task.clone()));
            }
            let resolved = resolve(registry, overrides, task, requirement)?;
            if resolved == *task {
                // A capability resolving back to the dependent itself.
                return Err(SetupError::InvalidDependency(task.clone()));
            }
            let edge = (resolved, task.clone());
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        }
    }

    Ok(TaskGraph { vertices, edges })
}

/// Resolve one requirement to a concrete task name.
fn resolve(
    registry: &TaskRegistry,
    overrides: &IndexMap<String, String>,
    task: &str,
    requirement: &str,
) -> Result<String> {
    if registry.contains(requirement) {
        return Ok(requirement.to_string());
    }

    let providers = registry.providers_of(requirement).ok_or_else(|| {
        SetupError::UnresolvedDependency {
            task: task.to_string(),
            requirement: requirement.to_string(),
        }
    })?;

    let selected = match overrides.get(requirement) {
        Some(choice) => {
            if !providers.contains(choice) {
                return Err(SetupError::UnknownProvider {
                    capability: requirement.to_string(),
                    task: choice.clone(),
                });
            }
            choice.clone()
        }
        // First-registered provider is the deterministic default.
        None => providers[0].clone(),
    };

    if !registry.contains(&selected) {
        return Err(SetupError::UnknownTask(selected));
    }
    Ok(selected)
}
