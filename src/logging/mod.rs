//! Structured logging setup using tracing
//!
//! Console output is always enabled; a JSON file layer with rotation can be
//! switched on through [`LoggingConfig`]. PII never reaches the logs: every
//! call site logs counts, categories and hashes, not surface text.

use crate::config::LoggingConfig;
use crate::domain::{Result, SigiloError};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of the program
/// to ensure file logs are flushed properly.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system based on configuration.
///
/// Returns a [`LoggingGuard`] that must be kept alive for the duration of
/// the program.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sigilo={log_level}")));

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(env_filter)
        .boxed();
    layers.push(console_layer);

    let file_guard = if config.local_enabled {
        let rotation = match config.local_rotation.as_str() {
            "hourly" => Rotation::HOURLY,
            _ => Rotation::DAILY,
        };

        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            SigiloError::Configuration(format!(
                "Failed to create log directory {}: {}",
                config.local_path, e
            ))
        })?;

        let file_appender = RollingFileAppender::new(rotation, &config.local_path, "sigilo.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("sigilo={log_level}")));
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_filter(file_filter)
            .boxed();
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry().with(layers).try_init().ok();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn parse_log_level(s: &str) -> Result<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(SigiloError::Configuration(format!(
            "Invalid log level: {s}"
        ))),
    }
}
