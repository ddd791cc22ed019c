//! ML frameworks and the target-support library: TVM, TFLite Micro, and
//! the ML interface library (mlif) that glues generated kernels to the
//! target toolchain.

use super::provision;
use crate::core::context::SetupContext;
use crate::core::types::TaskOutcome;

/// Apache TVM. Rebuilt whenever llvm changed earlier in the run, since the
/// cached build links against it.
pub fn tvm(ctx: &mut SetupContext, progress: bool) -> Result<TaskOutcome, String> {
    if ctx.has_changed("llvm") {
        ctx.cache.remove("tvm.install_dir");
    }
    let outcome = provision(ctx, "tvm", progress)?;
    if outcome == TaskOutcome::Changed {
        if let Some(reference) = ctx.config_str("tvm.ref").map(str::to_string) {
            ctx.cache.set("tvm.ref", reference);
        }
    }
    Ok(outcome)
}

/// TFLite Micro kernel library.
pub fn tflite_micro(ctx: &mut SetupContext, progress: bool) -> Result<TaskOutcome, String> {
    let outcome = provision(ctx, "tflite_micro", progress)?;
    if outcome == TaskOutcome::Changed {
        if let Some(reference) = ctx.config_str("tflite_micro.ref").map(str::to_string) {
            ctx.cache.set("tflite_micro.ref", reference);
        }
    }
    Ok(outcome)
}

/// ML interface library. Compiled with whichever task provides the
/// `riscv_compiler` capability, so a changed compiler invalidates it.
pub fn mlif(ctx: &mut SetupContext, progress: bool) -> Result<TaskOutcome, String> {
    if ctx.has_changed("riscv_gcc") || ctx.has_changed("llvm") {
        ctx.cache.remove("mlif.install_dir");
    }
    provision(ctx, "mlif", progress)
}
