//! Target runtime pieces: the Spike ISA simulator and the RISC-V proxy
//! kernel it boots bare-metal binaries with.

use super::provision;
use crate::core::context::SetupContext;
use crate::core::types::TaskOutcome;

/// Spike RISC-V ISA simulator.
pub fn spike(ctx: &mut SetupContext, progress: bool) -> Result<TaskOutcome, String> {
    provision(ctx, "spike", progress)
}

/// RISC-V proxy kernel. Built against spike and the selected RISC-V
/// compiler; invalidated when either changed this run.
pub fn pk(ctx: &mut SetupContext, progress: bool) -> Result<TaskOutcome, String> {
    if ctx.has_changed("spike") || ctx.has_changed("riscv_gcc") || ctx.has_changed("llvm") {
        ctx.cache.remove("pk.install_dir");
    }
    provision(ctx, "pk", progress)
}
