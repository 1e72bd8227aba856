//! Declarative environment schema.
//!
//! Every setting is described once as an [`EnvField`]: the field it fills,
//! the variable it is read from, an optional default and an optional
//! post-read transform. Fields are resolved against an [`EnvSource`], which is
//! the process environment in production and a plain map in tests.

use std::collections::{BTreeMap, HashMap};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Sources
// =============================================================================

/// Read-only view over a set of environment variables.
pub trait EnvSource {
    /// Value of `key`, or `None` if unset.
    fn get(&self, key: &str) -> Option<String>;

    /// All `(key, value)` pairs whose key starts with `prefix`, sorted by key.
    fn with_prefix(&self, prefix: &str) -> Vec<(String, String)>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        // vars_os: std::env::vars panics on non-unicode entries
        let mut vars: Vec<(String, String)> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();
        vars
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = self
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.sort();
        vars
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }

    fn with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

// =============================================================================
// Fields
// =============================================================================

/// One environment-backed setting.
#[derive(Debug, Clone, Copy)]
pub struct EnvField {
    /// Settings field this variable populates.
    pub name: &'static str,
    /// Environment variable name.
    pub key: &'static str,
    /// Default used when the variable is unset; `None` means required.
    pub default: Option<&'static str>,
    /// Applied to the raw value after it is read.
    pub transform: Option<fn(String) -> String>,
}

impl EnvField {
    pub const fn required(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            default: None,
            transform: None,
        }
    }

    pub const fn optional(name: &'static str, key: &'static str, default: &'static str) -> Self {
        Self {
            name,
            key,
            default: Some(default),
            transform: None,
        }
    }

    pub const fn with_transform(mut self, transform: fn(String) -> String) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Read the field from `env`, applying the default and transform.
    pub fn resolve(&self, env: &impl EnvSource) -> ConfigResult<String> {
        let raw = match (env.get(self.key), self.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default.to_string(),
            (None, None) => return Err(ConfigError::missing(self.key)),
        };

        Ok(match self.transform {
            Some(transform) => transform(raw),
            None => raw,
        })
    }

    /// Read the field as a strictly positive integer.
    pub fn resolve_positive(&self, env: &impl EnvSource) -> ConfigResult<u32> {
        let raw = self.resolve(env)?;
        let value: u32 = raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(self.key, format!("{} {:?} is not an integer ({})", self.name, raw, e)))?;

        if value == 0 {
            return Err(ConfigError::invalid(self.key, format!("{} must be greater than zero", self.name)));
        }
        Ok(value)
    }
}

/// Convert literal `\n` escape sequences into real newlines.
pub fn unescape_newlines(value: String) -> String {
    if value.contains("\\n") {
        value.replace("\\n", "\n")
    } else {
        value
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
