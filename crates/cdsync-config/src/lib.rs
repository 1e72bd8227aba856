//! Environment-driven configuration.
//!
//! This crate provides:
//! - A declarative schema for environment variables
//! - Firebase service account credentials with private key normalization
//! - Per-domain API keys and runtime settings
//! - An aggregate `AppConfig` with a serialization-backed `validate()`

pub mod app;
pub mod domain;
pub mod error;
pub mod firebase;
pub mod runtime;
pub mod schema;

pub use app::{validate_payload, AppConfig};
pub use domain::DomainApiSettings;
pub use error::{ConfigError, ConfigResult};
pub use firebase::{ServiceAccountPayload, ServiceCredentials};
pub use runtime::{LogLevel, RuntimeSettings};
pub use schema::{EnvField, EnvSource, ProcessEnv};
