//! Compiler toolchains: the RISC-V GNU toolchain and LLVM. Both provide
//! the `riscv_compiler` capability; `riscv_gcc` is the default because it
//! registers first.

use super::provision;
use crate::core::context::SetupContext;
use crate::core::types::TaskOutcome;

/// RISC-V GNU toolchain.
pub fn riscv_gcc(ctx: &mut SetupContext, progress: bool) -> Result<TaskOutcome, String> {
    let outcome = provision(ctx, "riscv_gcc", progress)?;
    if outcome == TaskOutcome::Changed {
        if let Some(variant) = ctx.config_str("riscv_gcc.variant").map(str::to_string) {
            ctx.cache.set("riscv_gcc.variant", variant);
        }
    }
    Ok(outcome)
}

/// LLVM toolchain.
pub fn llvm(ctx: &mut SetupContext, progress: bool) -> Result<TaskOutcome, String> {
    let outcome = provision(ctx, "llvm", progress)?;
    if outcome == TaskOutcome::Changed {
        if let Some(version) = ctx.config_str("llvm.version").map(str::to_string) {
            ctx.cache.set("llvm.version", version);
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::Environment;
    use crate::tasks::known_config_keys;

    fn test_ctx(dir: &std::path::Path) -> SetupContext {
        SetupContext::new(Environment::new("test", dir), &known_config_keys()).unwrap()
    }

    #[test]
    fn test_llvm_records_version() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());

        assert_eq!(llvm(&mut ctx, false), Ok(TaskOutcome::Changed));
        // default from the known-key table
        assert_eq!(ctx.cache.get("llvm.version"), Some("14.0.0"));
    }

    #[test]
    fn test_riscv_gcc_records_variant() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());

        assert_eq!(riscv_gcc(&mut ctx, false), Ok(TaskOutcome::Changed));
        assert_eq!(ctx.cache.get("riscv_gcc.variant"), Some("rv32gc"));
        assert!(ctx.cache.contains("riscv_gcc.install_dir"));
    }

    #[test]
    fn test_second_invocation_skips() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());

        llvm(&mut ctx, false).unwrap();
        assert_eq!(llvm(&mut ctx, false), Ok(TaskOutcome::Unchanged));
    }
}
