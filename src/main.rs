//! Montar CLI — toolchain setup orchestrator for embedded ML.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "montar",
    version,
    about = "Toolchain setup orchestrator for embedded ML — DAG-ordered install tasks with an incremental cache"
)]
struct Cli {
    #[command(subcommand)]
    command: montar::cli::Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = montar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
