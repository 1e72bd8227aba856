//! Per-domain API keys.
//!
//! Keys come from two places, applied in order:
//! - `DOMAIN_API_KEYS`: a JSON object of `{"domain": "key"}`
//! - `DOMAIN_<NAME>` or `DOMAIN_<NAME>_API_KEY`: one key for domain `<name>`
//!
//! Individual variables override entries from the JSON object.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::EnvSource;

pub const ENV_PREFIX: &str = "DOMAIN_";
pub const ENV_API_KEYS_JSON: &str = "DOMAIN_API_KEYS";
const API_KEY_SUFFIX: &str = "_API_KEY";

/// Mapping from domain name to API key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DomainApiSettings {
    api_keys: BTreeMap<String, String>,
}

impl DomainApiSettings {
    pub fn new(api_keys: BTreeMap<String, String>) -> ConfigResult<Self> {
        for (domain, key) in &api_keys {
            check_entry(ENV_API_KEYS_JSON, domain, key)?;
        }
        Ok(Self { api_keys })
    }

    pub fn from_source(env: &impl EnvSource) -> ConfigResult<Self> {
        let mut api_keys = match env.get(ENV_API_KEYS_JSON) {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str::<BTreeMap<String, String>>(&raw).map_err(|e| {
                    ConfigError::invalid(ENV_API_KEYS_JSON, format!("expected a JSON object of strings: {}", e))
                })?
            }
            _ => BTreeMap::new(),
        };

        for (var, key) in env.with_prefix(ENV_PREFIX) {
            if var == ENV_API_KEYS_JSON {
                continue;
            }
            let domain = domain_from_var(&var);
            check_entry(&var, &domain, &key)?;
            api_keys.insert(domain, key);
        }

        Self::new(api_keys)
    }

    /// API key for `domain`, if configured.
    pub fn get(&self, domain: &str) -> Option<&str> {
        self.api_keys.get(domain).map(String::as_str)
    }

    /// Configured domain names, sorted.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.api_keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.api_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.api_keys.is_empty()
    }
}

// Keys are secrets; only the domain names are printed.
impl std::fmt::Debug for DomainApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainApiSettings")
            .field("domains", &self.api_keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn domain_from_var(var: &str) -> String {
    let name = var.strip_prefix(ENV_PREFIX).unwrap_or(var);
    let name = name.strip_suffix(API_KEY_SUFFIX).unwrap_or(name);
    name.to_lowercase()
}

fn check_entry(var: &str, domain: &str, key: &str) -> ConfigResult<()> {
    if domain.trim().is_empty() {
        return Err(ConfigError::invalid(var, "domain name must not be empty"));
    }
    if key.trim().is_empty() {
        return Err(ConfigError::invalid(var, format!("API key for domain '{}' must not be empty", domain)));
    }
    Ok(())
}
