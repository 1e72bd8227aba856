//! Startup error types.

use cdsync_config::ConfigError;
use cdsync_firestore::InitError;
use thiserror::Error;

/// Errors that stop the worker before it is ready.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Init(#[from] InitError),
}

pub type StartupResult<T> = Result<T, StartupError>;
