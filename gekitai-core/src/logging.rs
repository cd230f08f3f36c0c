//! Process-wide `tracing` subscriber setup.

use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use std::sync::OnceLock;

use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

use crate::config::LoggingConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Overrides the configured level when set.
pub const LOG_ENV: &str = "GEKITAI_LOG";

fn filter_directive(config: &LoggingConfig) -> String {
    env::var(LOG_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}

fn open_log_file(config: &LoggingConfig) -> io::Result<Option<File>> {
    match &config.file {
        Some(path) => OpenOptions::new().create(true).append(true).open(path).map(Some),
        None => Ok(None),
    }
}

fn init_once(config: &LoggingConfig, once: &OnceLock<()>) {
    let _ = once.get_or_init(|| {
        let filter = EnvFilter::try_new(filter_directive(config))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(UtcTime::rfc_3339())
            .with_target(true);

        let (file, open_error) = match open_log_file(config) {
            Ok(file) => (file, None),
            Err(e) => (None, Some(e)),
        };

        let result = match (config.json, file) {
            (true, Some(file)) => tracing::subscriber::set_global_default(
                builder.json().with_current_span(false).with_writer(file).finish(),
            ),
            (true, None) => tracing::subscriber::set_global_default(
                builder
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr)
                    .finish(),
            ),
            (false, Some(file)) => tracing::subscriber::set_global_default(
                builder.with_ansi(false).with_writer(file).finish(),
            ),
            (false, None) => tracing::subscriber::set_global_default(
                builder.with_writer(std::io::stderr).finish(),
            ),
        };
        // Another subscriber (e.g. a test harness) may already be installed.
        let _ = result;

        if let (Some(e), Some(path)) = (open_error, config.file.as_ref()) {
            warn!(path = %path.display(), error = %e, "cannot open log file; logging to stderr");
        }
    });
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    init_once(config, &TRACING_INIT);
}
