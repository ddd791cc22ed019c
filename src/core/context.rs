//! Shared execution context — resolved environment paths, validated
//! configuration, the cache handle, and the per-run changed-set.
//!
//! The context is shared by reference across all tasks in a run; mutation
//! is serialized by the single-threaded execution model.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::warn;

use super::cache::DepsCache;
use super::environment::{yaml_value_to_string, Environment};
use super::errors::Result;

/// Prefix of configuration keys that override provider selection
/// (`provider.<capability> = <task>`).
pub const PROVIDER_KEY_PREFIX: &str = "provider.";

/// Table of configuration keys a deployment understands, with optional
/// defaults. Keys absent from this table (other than `provider.*`) are
/// rejected during validation.
pub type KnownConfigKeys = IndexMap<String, Option<String>>;

/// Outcome of configuration validation: which keys were taken as-is,
/// which were filled from defaults, and which the environment declared but
/// nothing understands.
#[derive(Debug, Clone, Default)]
pub struct ConfigReport {
    pub accepted: Vec<String>,
    pub defaulted: Vec<String>,
    pub rejected: Vec<String>,
}

impl ConfigReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Shared execution context handed to every task invocation.
pub struct SetupContext {
    pub environment: Environment,
    /// Validated configuration, values rendered as strings.
    pub config: IndexMap<String, String>,
    /// Durable key-value store; flushed by the run loop on full success.
    pub cache: DepsCache,
    /// Names of tasks that reported `Changed` so far in this run.
    /// Maintained by the run loop; read by downstream tasks.
    pub changed: BTreeSet<String>,
}

impl SetupContext {
    /// Build a context from an environment: validate its configuration
    /// against `known` and load the persisted cache if one exists.
    /// Returns the context together with the validation report.
    pub fn with_report(
        environment: Environment,
        known: &KnownConfigKeys,
    ) -> Result<(Self, ConfigReport)> {
        let mut report = ConfigReport::default();
        let mut config: IndexMap<String, String> = IndexMap::new();

        for (key, value) in &environment.config {
            let recognized =
                known.contains_key(key) || key.starts_with(PROVIDER_KEY_PREFIX);
            if recognized {
                config.insert(key.clone(), yaml_value_to_string(value));
                report.accepted.push(key.clone());
            } else {
                warn!(key = %key, "rejected unknown configuration key");
                report.rejected.push(key.clone());
            }
        }
        for (key, default) in known {
            if config.contains_key(key) {
                continue;
            }
            if let Some(default) = default {
                config.insert(key.clone(), default.clone());
                report.defaulted.push(key.clone());
            }
        }

        let cache = DepsCache::load_from_file(&environment.cache_path())?;
        let ctx = Self {
            environment,
            config,
            cache,
            changed: BTreeSet::new(),
        };
        Ok((ctx, report))
    }

    /// `with_report` without the report, for callers that only need the
    /// context.
    pub fn new(environment: Environment, known: &KnownConfigKeys) -> Result<Self> {
        Ok(Self::with_report(environment, known)?.0)
    }

    /// A validated configuration value.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// A configuration value interpreted as a boolean flag
    /// ("true"/"1" → true, anything else → false).
    pub fn config_flag(&self, key: &str) -> bool {
        matches!(self.config_str(key), Some("true") | Some("1"))
    }

    /// Install directory for one dependency under the deps root.
    pub fn install_dir(&self, name: &str) -> PathBuf {
        self.environment.deps_dir().join("install").join(name)
    }

    /// Provider overrides declared via `provider.<capability>` keys,
    /// in declaration order.
    pub fn provider_overrides(&self) -> IndexMap<String, String> {
        self.config
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(PROVIDER_KEY_PREFIX)
                    .map(|capability| (capability.to_string(), value.clone()))
            })
            .collect()
    }

    /// Whether `task` reported a change earlier in this run.
    pub fn has_changed(&self, task: &str) -> bool {
        self.changed.contains(task)
    }
}
