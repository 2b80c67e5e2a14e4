//! # Structured Logging Module
//!
//! Environment-aware structured logging for CI runs: human-readable console output
//! always, plus JSON file output when `STYLEGUARD_LOG_DIR` points somewhere. The
//! file layer exists so a failing batch can be diagnosed from CI artifacts after
//! the job is gone.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(EnvFilter::new(log_level.clone()));

        let file_layer = std::env::var("STYLEGUARD_LOG_DIR").ok().map(|dir| {
            let log_dir = PathBuf::from(dir);
            if !log_dir.exists() {
                fs::create_dir_all(&log_dir).expect("Failed to create log directory");
            }
            let filename = format!(
                "styleguard.{}.{}.log",
                process::id(),
                Utc::now().format("%Y%m%d_%H%M%S")
            );
            let file_appender = tracing_appender::rolling::never(&log_dir, filename);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            // The guard must outlive the process for buffered lines to flush.
            std::mem::forget(guard);

            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(log_level))
        });

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        // A global subscriber may already exist (e.g. in tests); that is not an error.
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::debug!(
            pid = process::id(),
            environment = %environment,
            "Structured logging initialized"
        );
    });
}

/// Current environment, from CI-conventional variables.
fn get_environment() -> String {
    std::env::var("STYLEGUARD_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| {
            if std::env::var("CI").is_ok() {
                "ci".to_string()
            } else {
                "development".to_string()
            }
        })
}

/// Default log level for an environment; `RUST_LOG` wins when set.
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("RUST_LOG") {
        return level;
    }
    match environment {
        "ci" => "info".to_string(),
        "development" | "test" => "debug".to_string(),
        _ => "info".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("STYLEGUARD_ENV", "test_override");
        let env = get_environment();
        assert_eq!(env, "test_override");
        std::env::remove_var("STYLEGUARD_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(get_log_level("ci"), "info");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("unknown"), "info");
    }
}
