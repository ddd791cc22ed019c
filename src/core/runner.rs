//! Incremental install loop — walks the resolved order, invokes each task
//! exactly once with the shared context, and persists the cache after a
//! fully successful pass.
//!
//! The loop itself never decides skip/no-skip: every task is invoked in
//! order and trusts its own cache-based short-circuit. Failure is fatal for
//! the remaining sequence and suppresses the cache flush, so a retried run
//! re-derives pending work from the previously persisted state.

use std::time::Instant;
use tracing::debug;

use super::context::SetupContext;
use super::errors::{Result, SetupError};
use super::graph;
use super::registry::TaskRegistry;
use super::scheduler;
use super::types::{ProgressSink, RunOptions, RunReport, TaskOutcome, TaskStatus};

/// Perform one full pass: reset changed flags, build the graph, compute
/// the order, run every task, and (on full success) flush the cache.
pub fn install_dependencies(
    registry: &mut TaskRegistry,
    ctx: &mut SetupContext,
    opts: &RunOptions,
    sink: &mut dyn ProgressSink,
) -> Result<RunReport> {
    let start = Instant::now();

    registry.reset_changes();
    ctx.changed.clear();

    let graph = graph::build(registry, &ctx.provider_overrides())?;
    let order = scheduler::execution_order(&graph)?;
    debug!(order = ?order, "resolved dependency order");

    sink.begin(registry.len());

    let mut changed: Vec<String> = Vec::new();
    for name in &order {
        debug!(task = %name, status = %TaskStatus::Running, "invoking task");
        let task = registry.lookup_mut(name)?;
        match (task.run)(ctx, opts.progress) {
            Ok(outcome) => {
                if outcome == TaskOutcome::Changed {
                    task.changed = true;
                    ctx.changed.insert(name.clone());
                    changed.push(name.clone());
                }
                debug!(task = %name, status = %TaskStatus::Succeeded, changed = ?outcome, "task done");
                sink.advance(name);
            }
            Err(reason) => {
                debug!(task = %name, status = %TaskStatus::Failed, "task failed");
                sink.finish();
                return Err(SetupError::TaskFailed {
                    task: name.clone(),
                    reason,
                });
            }
        }
    }

    if opts.write_cache {
        ctx.cache.write_to_file(&ctx.environment.cache_path())?;
    }
    sink.finish();

    Ok(RunReport {
        order,
        changed,
        total_duration: start.elapsed(),
    })
}
