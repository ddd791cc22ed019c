//! Persistent dependency cache — flat string key→value store with an
//! INI-like on-disk layout.
//!
//! Keys are dotted names (`llvm.install_dir`); the prefix before the first
//! dot becomes the `[section]` header on disk. Keys without a dot are
//! written before any section. Values escape `\`, newline, and carriage
//! return; nothing else. Writes are wholesale and atomic (temp + rename).

use indexmap::IndexMap;
use std::path::Path;

use super::errors::{Result, SetupError};

/// Conventional cache file name under the dependency-install root.
pub const CACHE_FILE_NAME: &str = "cache.ini";

/// In-memory dependency cache, insertion-ordered.
#[derive(Debug, Clone, Default)]
pub struct DepsCache {
    entries: IndexMap<String, String>,
}

impl DepsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by full dotted key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or replace a value. Values are stored trimmed.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), value.into().trim().to_string());
    }

    /// Remove a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Load a cache from disk. A missing file yields an empty cache so a
    /// first run starts from nothing.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| SetupError::io(path, e))?;
        Self::parse(&content).map_err(|reason| SetupError::Cache {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut cache = Self::new();
        let mut section = String::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[') {
                let name = name
                    .strip_suffix(']')
                    .ok_or_else(|| format!("line {}: unterminated section header", idx + 1))?;
                section = name.trim().to_string();
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| format!("line {}: expected 'key = value'", idx + 1))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("line {}: empty key", idx + 1));
            }
            let full_key = if section.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", section, key)
            };
            cache
                .entries
                .insert(full_key, unescape(value.trim(), idx + 1)?);
        }

        Ok(cache)
    }

    /// Persist the cache atomically: write a temp file next to the target,
    /// then rename over it.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SetupError::io(parent, e))?;
        }

        let tmp_path = path.with_extension("ini.tmp");
        std::fs::write(&tmp_path, self.render()).map_err(|e| SetupError::io(&tmp_path, e))?;
        std::fs::rename(&tmp_path, path).map_err(|e| SetupError::io(path, e))?;

        Ok(())
    }

    /// Render the on-disk text: top-level keys first, then sections in
    /// first-insertion order.
    fn render(&self) -> String {
        let mut sections: IndexMap<&str, Vec<(&str, &str)>> = IndexMap::new();
        let mut top_level: Vec<(&str, &str)> = Vec::new();

        for (key, value) in &self.entries {
            match key.split_once('.') {
                Some((section, rest)) => {
                    sections.entry(section).or_default().push((rest, value));
                }
                None => top_level.push((key, value)),
            }
        }

        let mut out = String::from("# montar dependency cache\n");
        for (key, value) in top_level {
            out.push_str(&format!("{} = {}\n", key, escape(value)));
        }
        for (section, entries) in sections {
            out.push_str(&format!("\n[{}]\n", section));
            for (key, value) in entries {
                out.push_str(&format!("{} = {}\n", key, escape(value)));
            }
        }
        out
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn unescape(value: &str, line: usize) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => return Err(format!("line {}: invalid escape '\\{}'", line, other)),
            None => return Err(format!("line {}: dangling backslash", line)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_get() {
        let mut cache = DepsCache::new();
        cache.set("llvm.version", "14.0.0");
        assert_eq!(cache.get("llvm.version"), Some("14.0.0"));
        assert_eq!(cache.get("llvm.missing"), None);
    }

    #[test]
    fn test_set_trims_value() {
        let mut cache = DepsCache::new();
        cache.set("k", "  padded  ");
        assert_eq!(cache.get("k"), Some("padded"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DepsCache::load_from_file(&dir.path().join("cache.ini")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_roundtrip_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.ini");

        let mut cache = DepsCache::new();
        cache.set("environment", "default");
        cache.set("llvm.version", "14.0.0");
        cache.set("llvm.install_dir", "/deps/install/llvm");
        cache.set("tvm.src_dir", "/deps/src/tvm");
        cache.write_to_file(&path).unwrap();

        let loaded = DepsCache::load_from_file(&path).unwrap();
        assert_eq!(loaded.get("environment"), Some("default"));
        assert_eq!(loaded.get("llvm.version"), Some("14.0.0"));
        assert_eq!(loaded.get("llvm.install_dir"), Some("/deps/install/llvm"));
        assert_eq!(loaded.get("tvm.src_dir"), Some("/deps/src/tvm"));
        assert_eq!(loaded.len(), 4);
    }

    #[test]
    fn test_on_disk_layout_groups_sections() {
        let mut cache = DepsCache::new();
        cache.set("llvm.version", "14.0.0");
        cache.set("tvm.ref", "main");
        cache.set("llvm.install_dir", "/x");
        let text = cache.render();
        // One [llvm] section holding both llvm keys
        assert_eq!(text.matches("[llvm]").count(), 1);
        let llvm_at = text.find("[llvm]").unwrap();
        let tvm_at = text.find("[tvm]").unwrap();
        assert!(llvm_at < tvm_at, "first-insertion section order");
    }

    #[test]
    fn test_escaping_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.ini");

        let mut cache = DepsCache::new();
        cache.set("build.flags", "-O2 \\ -g\nline2");
        cache.write_to_file(&path).unwrap();

        let loaded = DepsCache::load_from_file(&path).unwrap();
        assert_eq!(loaded.get("build.flags"), Some("-O2 \\ -g\nline2"));
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = DepsCache::parse("[llvm]\nno equals sign here").unwrap_err();
        assert!(err.contains("line 2"));
    }

    #[test]
    fn test_parse_rejects_unterminated_section() {
        let err = DepsCache::parse("[llvm").unwrap_err();
        assert!(err.contains("line 1"));
    }

    #[test]
    fn test_parse_rejects_bad_escape() {
        let err = DepsCache::parse("k = a\\q").unwrap_err();
        assert!(err.contains("invalid escape"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let cache = DepsCache::parse("# header\n\n[s]\n# inner\nk = v\n").unwrap();
        assert_eq!(cache.get("s.k"), Some("v"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.ini");
        let mut cache = DepsCache::new();
        cache.set("a.b", "c");
        cache.write_to_file(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("ini.tmp").exists());
    }

    #[test]
    fn test_remove() {
        let mut cache = DepsCache::new();
        cache.set("a.b", "c");
        assert_eq!(cache.remove("a.b"), Some("c".to_string()));
        assert!(!cache.contains("a.b"));
    }

    proptest! {
        #[test]
        fn prop_values_roundtrip(value in "[ -~\\n\\\\]{0,64}") {
            let mut cache = DepsCache::new();
            cache.set("section.key", value.clone());
            let reparsed = DepsCache::parse(&cache.render()).unwrap();
            // Stored trimmed; parse must give back exactly what set() kept.
            prop_assert_eq!(reparsed.get("section.key"), cache.get("section.key"));
        }
    }
}
