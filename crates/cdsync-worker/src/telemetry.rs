//! Tracing subscriber setup.
//!
//! `LOG_LEVEL` picks the default verbosity, `RUST_LOG` overrides it with full
//! filter directives, and `LOG_FORMAT=json` switches to JSON lines.

use cdsync_config::LogLevel;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level requested in `LOG_LEVEL`, or the default.
///
/// Read before the full configuration so that configuration errors are logged.
pub fn level_from_env() -> LogLevel {
    std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

pub fn use_json_format() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false)
}

/// Filter from `RUST_LOG`, falling back to `level`.
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}

/// Install the global subscriber.
pub fn init_tracing(level: LogLevel) {
    let env_filter = env_filter(level);

    let installed = if use_json_format() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()
    };

    if let Err(e) = installed {
        warn!("Tracing subscriber already installed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    #[serial]
    fn test_level_from_env() {
        std::env::set_var("LOG_LEVEL", "warning");
        assert_eq!(level_from_env(), LogLevel::Warning);

        std::env::set_var("LOG_LEVEL", "LOUD");
        assert_eq!(level_from_env(), LogLevel::Info);

        std::env::remove_var("LOG_LEVEL");
        assert_eq!(level_from_env(), LogLevel::Info);
    }

    #[test]
    #[serial]
    fn test_filter_uses_log_level_without_rust_log() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(env_filter(LogLevel::Critical).max_level_hint(), Some(LevelFilter::ERROR));
        assert_eq!(env_filter(LogLevel::Debug).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_log_level() {
        std::env::set_var("RUST_LOG", "trace");
        assert_eq!(env_filter(LogLevel::Error).max_level_hint(), Some(LevelFilter::TRACE));
        std::env::remove_var("RUST_LOG");
    }

    #[test]
    #[serial]
    fn test_json_format_switch() {
        std::env::set_var("LOG_FORMAT", "JSON");
        assert!(use_json_format());
        std::env::set_var("LOG_FORMAT", "pretty");
        assert!(!use_json_format());
        std::env::remove_var("LOG_FORMAT");
        assert!(!use_json_format());
    }
}
