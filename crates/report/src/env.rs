//! Dotenv-style file loading and the environment snapshot
//!
//! The env file is applied to a target without overwriting keys the target
//! already defines. After loading, the rest of the pipeline only ever sees an
//! [`EnvSnapshot`] taken once at startup.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::ReportResult;

/// Something that env file entries can be applied to
pub trait EnvTarget {
    fn contains(&self, key: &str) -> bool;
    fn set(&mut self, key: &str, value: &str);
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvTarget for ProcessEnv {
    fn contains(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }

    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

/// Immutable-by-convention copy of the environment keys
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value for `key`, treating an empty or whitespace-only value as unset
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvTarget for EnvSnapshot {
    fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Parse `KEY=VALUE` lines. Comments, blank lines and lines without `=` are
/// dropped; one pair of matching surrounding quotes is removed from values.
pub fn parse_env_file(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();

    for raw_line in content.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line).trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((left, right)) = line.split_once('=') else {
            continue;
        };

        let key = left.trim();
        if key.is_empty() {
            continue;
        }

        entries.push((key.to_string(), unquote(right.trim()).to_string()));
    }

    entries
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Apply the env file at `path` to `target`. Returns the number of keys set.
///
/// A missing file is not an error and invalid UTF-8 is decoded lossily. Keys
/// the target already defines are left untouched, including keys set by an
/// earlier line of the same file.
pub fn load_env_file<T: EnvTarget>(path: &Path, target: &mut T) -> ReportResult<usize> {
    if !path.exists() {
        debug!("No env file at {}", path.display());
        return Ok(0);
    }

    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let mut assigned = 0;

    for (key, value) in parse_env_file(&content) {
        if target.contains(&key) {
            continue;
        }
        target.set(&key, &value);
        assigned += 1;
    }

    debug!("Loaded {} key(s) from {}", assigned, path.display());
    Ok(assigned)
}
