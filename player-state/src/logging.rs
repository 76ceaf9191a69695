//! Logging setup for applications embedding the state machine
//!
//! The crate itself only emits `tracing` events. This module installs a
//! subscriber for binaries and tests that want to see them.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber installed
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode
///
/// # Environment Variables
///
/// - `PLAYER_LOG_LEVEL`: Filter directive (e.g. `debug`, `player_state=trace`)
/// - `RUST_LOG`: Used when `PLAYER_LOG_LEVEL` is unset
///
/// # Examples
///
/// ```rust,ignore
/// player_state::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info");

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug");

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Parse a mode name as used by `PLAYER_LOG_MODE`
///
/// Anything unrecognised is `Silent`.
pub fn mode_from_str(value: &str) -> LoggingMode {
    match value.trim().to_lowercase().as_str() {
        "development" | "dev" => LoggingMode::Development,
        "debug" => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    }
}

/// Initialize logging from the `PLAYER_LOG_MODE` environment variable
///
/// Accepts "silent", "development" or "debug"; defaults to silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var("PLAYER_LOG_MODE")
        .map(|value| mode_from_str(&value))
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

/// `PLAYER_LOG_LEVEL`, then `RUST_LOG`, then the given default
fn create_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("PLAYER_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

pub fn init_silent() -> Result<(), LoggingError> {
    init_logging(LoggingMode::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
        assert!(init_silent().is_ok());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(mode_from_str("debug"), LoggingMode::Debug);
        assert_eq!(mode_from_str("Development"), LoggingMode::Development);
        assert_eq!(mode_from_str("loud"), LoggingMode::Silent);
    }
}
