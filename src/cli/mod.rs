//! CLI subcommands — init, validate, order, install, status.

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::core::{
    install_dependencies, DepsCache, Environment, NoProgress, ProgressSink, Result, RunOptions,
    SetupContext, SetupError, TaskRegistry,
};
use crate::tasks;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new environment directory
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate environment.yml and report configuration keys
    Validate {
        /// Path to environment.yml
        #[arg(short, long, default_value = "environment.yml")]
        environment: PathBuf,
    },

    /// Show the resolved execution order without running anything
    Order {
        /// Path to environment.yml
        #[arg(short, long, default_value = "environment.yml")]
        environment: PathBuf,
    },

    /// Install all dependencies in dependency order
    Install {
        /// Path to environment.yml
        #[arg(short, long, default_value = "environment.yml")]
        environment: PathBuf,

        /// Show a progress bar (one unit per task)
        #[arg(long)]
        progress: bool,

        /// Do not persist the cache after the run
        #[arg(long)]
        no_write_cache: bool,
    },

    /// Show the persisted dependency cache
    Status {
        /// Path to environment.yml
        #[arg(short, long, default_value = "environment.yml")]
        environment: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { environment } => cmd_validate(&environment),
        Commands::Order { environment } => cmd_order(&environment),
        Commands::Install {
            environment,
            progress,
            no_write_cache,
        } => cmd_install(&environment, progress, !no_write_cache),
        Commands::Status { environment } => cmd_status(&environment),
    }
}

fn default_registry() -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    tasks::register_defaults(&mut registry)?;
    Ok(registry)
}

fn cmd_init(path: &Path) -> Result<()> {
    let env_path = path.join("environment.yml");
    if env_path.exists() {
        return Err(SetupError::Environment {
            path: env_path,
            reason: "already exists".to_string(),
        });
    }

    let deps_dir = path.join("deps");
    std::fs::create_dir_all(&deps_dir).map_err(|e| SetupError::io(&deps_dir, e))?;

    let template = r#"version: "1.0"
name: my-environment

paths:
  deps: deps

config:
  llvm.version: "14.0.0"
  riscv_gcc.variant: rv32gc
  # provider.riscv_compiler: llvm
"#;
    std::fs::write(&env_path, template).map_err(|e| SetupError::io(&env_path, e))?;

    println!("Initialized montar environment at {}", path.display());
    println!("  Created: {}", env_path.display());
    println!("  Created: {}/", deps_dir.display());
    Ok(())
}

fn cmd_validate(environment: &Path) -> Result<()> {
    let env = Environment::load(environment)?;
    let known = tasks::known_config_keys();
    let (_, report) = SetupContext::with_report(env, &known)?;

    for key in &report.accepted {
        println!("  accepted:  {}", key);
    }
    for key in &report.defaulted {
        println!("  defaulted: {}", key);
    }
    for key in &report.rejected {
        eprintln!("  REJECTED:  {}", key);
    }

    if report.is_clean() {
        println!(
            "OK: {} accepted, {} defaulted",
            report.accepted.len(),
            report.defaulted.len()
        );
        Ok(())
    } else {
        Err(SetupError::Environment {
            path: environment.to_path_buf(),
            reason: format!("{} unknown configuration key(s)", report.rejected.len()),
        })
    }
}

fn cmd_order(environment: &Path) -> Result<()> {
    let env = Environment::load(environment)?;
    let registry = default_registry()?;
    let ctx = SetupContext::new(env, &tasks::known_config_keys())?;

    let graph = crate::core::graph::build(&registry, &ctx.provider_overrides())?;
    let order = crate::core::scheduler::execution_order(&graph)?;

    for (i, name) in order.iter().enumerate() {
        println!("{:3}. {}", i + 1, name);
    }
    Ok(())
}

fn cmd_install(environment: &Path, progress: bool, write_cache: bool) -> Result<()> {
    let env = Environment::load(environment)?;
    let mut registry = default_registry()?;
    let mut ctx = SetupContext::new(env, &tasks::known_config_keys())?;

    let opts = RunOptions {
        progress,
        write_cache,
    };

    let report = if progress {
        let mut bar = InstallBar::default();
        install_dependencies(&mut registry, &mut ctx, &opts, &mut bar)?
    } else {
        install_dependencies(&mut registry, &mut ctx, &opts, &mut NoProgress)?
    };

    println!(
        "Installed {} dependencies ({} changed, {} already satisfied) in {:.2}s",
        report.order.len(),
        report.changed.len(),
        report.unchanged_count(),
        report.total_duration.as_secs_f64()
    );
    if !write_cache {
        println!("Cache not written (--no-write-cache)");
    }
    Ok(())
}

fn cmd_status(environment: &Path) -> Result<()> {
    let env = Environment::load(environment)?;
    let cache_path = env.cache_path();
    let cache = DepsCache::load_from_file(&cache_path)?;

    if cache.is_empty() {
        println!("Cache is empty (no successful run recorded yet)");
        return Ok(());
    }

    println!("Cache: {} ({} entries)", cache_path.display(), cache.len());
    for (key, value) in cache.iter() {
        println!("  {} = {}", key, value);
    }
    Ok(())
}

/// Terminal progress bar: one unit per task.
#[derive(Default)]
struct InstallBar {
    bar: Option<ProgressBar>,
}

impl ProgressSink for InstallBar {
    fn begin(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "Installing dependencies {bar:40} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar = Some(bar);
    }

    fn advance(&mut self, task: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(task.to_string());
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message("done");
        }
    }
}
