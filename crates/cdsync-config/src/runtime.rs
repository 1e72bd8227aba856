//! Process-wide runtime settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use validator::Validate;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{split_csv, EnvField, EnvSource};

pub const SYNC_INTERVAL_MINUTES: EnvField =
    EnvField::optional("sync_interval_minutes", "SYNC_INTERVAL_MINUTES", "30");
pub const MAX_CONCURRENT_REQUESTS: EnvField =
    EnvField::optional("max_concurrent_requests", "MAX_CONCURRENT_REQUESTS", "5");
pub const LOG_LEVEL: EnvField = EnvField::optional("log_level", "LOG_LEVEL", "INFO");
pub const ALLOWED_DOMAINS: EnvField =
    EnvField::optional("allowed_domains", "ALLOWED_DOMAINS", "ecommerce,logistics,finance,manufacturing");

// =============================================================================
// Log level
// =============================================================================

/// Log verbosity accepted in `LOG_LEVEL`.
///
/// `SUCCESS` and `CRITICAL` are accepted for compatibility with existing
/// deployments and map onto `info` and `error`. `WARN` and `WARNING` both
/// filter at `warn` but keep their own spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Success,
    Warn,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info | LogLevel::Success => "info",
            LogLevel::Warn | LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warn => "WARN",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "SUCCESS" => Ok(LogLevel::Success),
            "WARN" => Ok(LogLevel::Warn),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ConfigError::invalid(
                LOG_LEVEL.key,
                format!(
                    "unknown level '{}', expected one of TRACE, DEBUG, INFO, SUCCESS, WARN, WARNING, ERROR, CRITICAL",
                    s
                ),
            )),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Sync cadence, concurrency and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct RuntimeSettings {
    /// Minutes between sync passes.
    #[validate(range(min = 1, message = "sync_interval_minutes must be positive"))]
    pub sync_interval_minutes: u32,
    /// Upper bound on in-flight outbound requests.
    #[validate(range(min = 1, message = "max_concurrent_requests must be positive"))]
    pub max_concurrent_requests: u32,
    pub log_level: LogLevel,
    /// Domains the service is allowed to sync.
    pub allowed_domains: Vec<String>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            sync_interval_minutes: 30,
            max_concurrent_requests: 5,
            log_level: LogLevel::Info,
            allowed_domains: ["ecommerce", "logistics", "finance", "manufacturing"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RuntimeSettings {
    pub fn from_source(env: &impl EnvSource) -> ConfigResult<Self> {
        Ok(Self {
            sync_interval_minutes: SYNC_INTERVAL_MINUTES.resolve_positive(env)?,
            max_concurrent_requests: MAX_CONCURRENT_REQUESTS.resolve_positive(env)?,
            log_level: LOG_LEVEL.resolve(env)?.parse()?,
            allowed_domains: split_csv(&ALLOWED_DOMAINS.resolve(env)?),
        })
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.sync_interval_minutes) * 60)
    }

    pub fn is_domain_allowed(&self, domain: &str) -> bool {
        self.allowed_domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }
}
