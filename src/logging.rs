//! Logging setup.
//!
//! TUI mode writes to `<state>/logs/rcsa-{datetime}.log` so log lines never
//! land on the alternate screen; CLI commands log to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rcsa_wizard::config::Config;

/// Keeps the non-blocking writer alive; drop it last so buffered lines are flushed.
pub struct LoggingHandle {
    pub _guard: Option<WorkerGuard>,
    /// Set only when logging to a file
    pub log_file_path: Option<PathBuf>,
}

/// File name for a session started at `at`
pub fn log_file_name(at: DateTime<Utc>) -> String {
    format!("rcsa-{}.log", at.format("%Y%m%dT%H%M%SZ"))
}

/// `RUST_LOG` wins over `--debug`, which wins over the configured level
fn filter_directive(config: &Config, debug_override: bool, rust_log: Option<String>) -> String {
    rust_log.unwrap_or_else(|| {
        if debug_override {
            "debug".to_string()
        } else {
            config.logging.level.clone()
        }
    })
}

pub fn init_logging(config: &Config, is_tui_mode: bool, debug_override: bool) -> Result<LoggingHandle> {
    let directive = filter_directive(config, debug_override, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    if is_tui_mode && config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

        let log_filename = log_file_name(Utc::now());
        let log_file_path = logs_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 12, 2, 10, 30, 5).unwrap();
        assert_eq!(log_file_name(at), "rcsa-20241202T103005Z.log");
    }

    #[test]
    fn test_filter_precedence() {
        let config = Config::default();
        assert_eq!(filter_directive(&config, false, None), "info");
        assert_eq!(filter_directive(&config, true, None), "debug");
        assert_eq!(
            filter_directive(&config, true, Some("rcsa_wizard=trace".to_string())),
            "rcsa_wizard=trace"
        );
    }

    #[test]
    fn test_configured_level_used() {
        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        assert_eq!(filter_directive(&config, false, None), "warn");
    }
}
