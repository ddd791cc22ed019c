//! `environment.yml` parsing — the description of one setup tree: its
//! name, resolved paths (including the dependency-install root), and the
//! flat dotted-key configuration map consumed by tasks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::cache::CACHE_FILE_NAME;
use super::errors::{Result, SetupError};

/// Root environment description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Human-readable environment name
    pub name: String,

    /// Resolved filesystem layout
    #[serde(default)]
    pub paths: SetupPaths,

    /// Configuration values keyed by dotted names (`component.option`)
    #[serde(default)]
    pub config: IndexMap<String, serde_yaml_ng::Value>,

    /// Directory the environment file lives in; anchor for relative paths.
    #[serde(skip)]
    pub home: PathBuf,
}

/// Filesystem layout of an environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupPaths {
    /// Dependency-install root, relative to the environment home unless
    /// absolute.
    #[serde(default = "default_deps_dir")]
    pub deps: PathBuf,
}

impl Default for SetupPaths {
    fn default() -> Self {
        Self {
            deps: default_deps_dir(),
        }
    }
}

fn default_deps_dir() -> PathBuf {
    PathBuf::from("deps")
}

impl Environment {
    /// A fresh environment rooted at `home`, with default paths and no
    /// configuration.
    pub fn new(name: &str, home: impl Into<PathBuf>) -> Self {
        Self {
            version: "1.0".to_string(),
            name: name.to_string(),
            paths: SetupPaths::default(),
            config: IndexMap::new(),
            home: home.into(),
        }
    }

    /// Load an environment file from disk. The file's directory becomes
    /// the environment home.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SetupError::io(path, e))?;
        let mut env: Environment =
            serde_yaml_ng::from_str(&content).map_err(|e| SetupError::Environment {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if env.version != "1.0" {
            return Err(SetupError::Environment {
                path: path.to_path_buf(),
                reason: format!("version must be \"1.0\", got \"{}\"", env.version),
            });
        }
        env.home = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(env)
    }

    /// Dependency-install root, anchored at the environment home.
    pub fn deps_dir(&self) -> PathBuf {
        if self.paths.deps.is_absolute() {
            self.paths.deps.clone()
        } else {
            self.home.join(&self.paths.deps)
        }
    }

    /// Path of the persisted cache file for this tree.
    pub fn cache_path(&self) -> PathBuf {
        self.deps_dir().join(CACHE_FILE_NAME)
    }

    /// A configuration value rendered as a string.
    pub fn config_str(&self, key: &str) -> Option<String> {
        self.config.get(key).map(yaml_value_to_string)
    }
}

/// Convert a scalar YAML value to its string form.
pub fn yaml_value_to_string(val: &serde_yaml_ng::Value) -> String {
    match val {
        serde_yaml_ng::Value::String(s) => s.clone(),
        serde_yaml_ng::Value::Number(n) => n.to_string(),
        serde_yaml_ng::Value::Bool(b) => b.to_string(),
        serde_yaml_ng::Value::Null => String::new(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_full_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yml");
        std::fs::write(
            &path,
            r#"
version: "1.0"
name: rv32-default
paths:
  deps: toolchains
config:
  llvm.version: "14.0.0"
  spike.keep_build_dir: false
"#,
        )
        .unwrap();

        let env = Environment::load(&path).unwrap();
        assert_eq!(env.name, "rv32-default");
        assert_eq!(env.home, dir.path());
        assert_eq!(env.deps_dir(), dir.path().join("toolchains"));
        assert_eq!(env.config_str("llvm.version").as_deref(), Some("14.0.0"));
        assert_eq!(env.config_str("spike.keep_build_dir").as_deref(), Some("false"));
        assert_eq!(env.config_str("missing"), None);
    }

    #[test]
    fn test_default_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yml");
        std::fs::write(&path, "version: \"1.0\"\nname: minimal\n").unwrap();

        let env = Environment::load(&path).unwrap();
        assert_eq!(env.deps_dir(), dir.path().join("deps"));
        assert_eq!(env.cache_path(), dir.path().join("deps").join("cache.ini"));
    }

    #[test]
    fn test_absolute_deps_path_wins() {
        let mut env = Environment::new("t", "/home/user/env");
        env.paths.deps = PathBuf::from("/opt/deps");
        assert_eq!(env.deps_dir(), PathBuf::from("/opt/deps"));
    }

    #[test]
    fn test_bad_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yml");
        std::fs::write(&path, "version: \"2.0\"\nname: x\n").unwrap();
        let err = Environment::load(&path).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Environment::load(Path::new("/nonexistent/environment.yml")).unwrap_err();
        assert!(matches!(err, SetupError::Io { .. }));
    }

    #[test]
    fn test_yaml_value_to_string() {
        assert_eq!(
            yaml_value_to_string(&serde_yaml_ng::Value::String("hello".into())),
            "hello"
        );
        assert_eq!(yaml_value_to_string(&serde_yaml_ng::Value::Bool(true)), "true");
        assert_eq!(yaml_value_to_string(&serde_yaml_ng::Value::Null), "");
    }
}
