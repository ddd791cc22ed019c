//! Default install tasks — one per external dependency of the embedded-ML
//! toolchain (compilers, frameworks, simulator, proxy kernel).
//!
//! Each task follows the same contract: consult the cache to skip
//! already-satisfied work, provision its install directory under
//! `<deps>/install/<name>`, optionally run a configured install command,
//! and record its cache keys. The run loop never decides skips; the tasks
//! do.

pub mod frameworks;
pub mod runtime;
pub mod toolchain;

use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::core::context::{KnownConfigKeys, SetupContext};
use crate::core::registry::TaskRegistry;
use crate::core::types::TaskOutcome;

/// Register the default task set. Registration order is load-bearing: it
/// is the scheduler tie-break and the default provider selection.
pub fn register_defaults(registry: &mut TaskRegistry) -> crate::core::Result<()> {
    registry.register(
        "riscv_gcc",
        &[],
        &["riscv_compiler"],
        toolchain::riscv_gcc,
    )?;
    registry.register("llvm", &[], &["riscv_compiler"], toolchain::llvm)?;
    registry.register("tvm", &["llvm"], &[], frameworks::tvm)?;
    registry.register("tflite_micro", &[], &[], frameworks::tflite_micro)?;
    registry.register("mlif", &["riscv_compiler"], &[], frameworks::mlif)?;
    registry.register("spike", &[], &[], runtime::spike)?;
    registry.register("pk", &["riscv_compiler", "spike"], &[], runtime::pk)?;
    Ok(())
}

/// Configuration keys the default tasks understand, with defaults where
/// one exists. Anything else in `environment.yml` is rejected by context
/// validation (except `provider.*` overrides).
pub fn known_config_keys() -> KnownConfigKeys {
    KnownConfigKeys::from([
        ("riscv_gcc.variant".to_string(), Some("rv32gc".to_string())),
        ("riscv_gcc.install_cmd".to_string(), None),
        ("llvm.version".to_string(), Some("14.0.0".to_string())),
        ("llvm.install_cmd".to_string(), None),
        ("tvm.ref".to_string(), Some("main".to_string())),
        ("tvm.install_cmd".to_string(), None),
        ("tflite_micro.ref".to_string(), Some("main".to_string())),
        ("tflite_micro.install_cmd".to_string(), None),
        ("mlif.install_cmd".to_string(), None),
        ("spike.install_cmd".to_string(), None),
        ("pk.install_cmd".to_string(), None),
    ])
}

/// Output of an install command.
pub(crate) struct ExecOutput {
    pub exit_code: i32,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run a configured install command via `sh -c` inside the install
/// directory. The directory is also exported as MONTAR_INSTALL_DIR.
pub(crate) fn run_install_cmd(cmd: &str, install_dir: &Path) -> Result<ExecOutput, String> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .current_dir(install_dir)
        .env("MONTAR_INSTALL_DIR", install_dir)
        .output()
        .map_err(|e| format!("failed to spawn sh: {}", e))?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Shared provisioning skeleton: skip when the cached install directory
/// still exists, otherwise (re)create it, run the optional
/// `<name>.install_cmd`, and record the cache key.
pub(crate) fn provision(
    ctx: &mut SetupContext,
    name: &str,
    progress: bool,
) -> Result<TaskOutcome, String> {
    let dir_key = format!("{}.install_dir", name);
    if let Some(dir) = ctx.cache.get(&dir_key) {
        if Path::new(dir).is_dir() {
            debug!(task = %name, "already satisfied, skipping");
            return Ok(TaskOutcome::Unchanged);
        }
        // Stale entry: the directory vanished since the last run.
    }

    if progress {
        debug!(task = %name, "installing");
    } else {
        info!(task = %name, "installing");
    }

    let dir = ctx.install_dir(name);
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;

    let cmd_key = format!("{}.install_cmd", name);
    if let Some(cmd) = ctx.config_str(&cmd_key).map(str::to_string) {
        let out = run_install_cmd(&cmd, &dir)?;
        if !out.success() {
            return Err(format!(
                "install command exited with code {}: {}",
                out.exit_code,
                out.stderr.trim()
            ));
        }
    }

    ctx.cache.set(dir_key, dir.display().to_string());
    Ok(TaskOutcome::Changed)
}
