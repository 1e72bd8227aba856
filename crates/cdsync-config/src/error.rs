//! Configuration error types.

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Boxed underlying cause of a validation failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key} is not set")]
    Missing { key: String },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Configuration validation failed: {source}")]
    Validation {
        #[source]
        source: BoxError,
    },
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing { key: key.into() }
    }

    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(source: impl Into<BoxError>) -> Self {
        Self::Validation {
            source: source.into(),
        }
    }

    /// Environment variable this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { key } | ConfigError::Invalid { key, .. } => Some(key),
            ConfigError::Validation { .. } => None,
        }
    }
}
