//! Setup engine: registry → graph → order → run loop → cache.

pub mod cache;
pub mod context;
pub mod environment;
pub mod errors;
pub mod graph;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod types;

pub use cache::DepsCache;
pub use context::{ConfigReport, KnownConfigKeys, SetupContext};
pub use environment::Environment;
pub use errors::{Result, SetupError};
pub use registry::TaskRegistry;
pub use runner::install_dependencies;
pub use types::{NoProgress, ProgressSink, RunOptions, RunReport, TaskOutcome};
