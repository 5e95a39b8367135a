//! Logging bootstrap for applications embedding the SDK
//!
//! Applications driving a UI (TUIs especially) need the SDK to stay quiet on
//! stdout/stderr; development builds want structured logs. This module wraps
//! the `tracing-subscriber` setup so neither case has to repeat it.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// How much the SDK is allowed to write to stderr
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No output at all; the right choice for TUI front-ends
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose output with source locations
    Debug,
}

/// Logging setup failure
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install the global tracing subscriber for `mode`
///
/// Call once, early, before any session activity. The filter honors
/// `SETTOP_LOG_LEVEL` and falls back to `RUST_LOG`.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .compact(),
                )
                .with(env_filter("info"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Install logging according to `SETTOP_LOG_MODE`
///
/// Accepts "development" and "debug"; anything else (including unset) stays
/// silent so embedding UIs render cleanly by default.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("SETTOP_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };

    init_logging(mode)
}

/// Whether a global subscriber has already been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("SETTOP_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}
