//! Tracing subscriber setup shared by both binaries.
//!
//! Logs go to stderr so stdout carries only the user-facing report.
//! `RUST_LOG` overrides the configured level.

use tracing_subscriber::EnvFilter;

use crate::config::{AppSection, LogFormat};

/// Install the global subscriber described by `[app]`.
pub fn init(app: &AppSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&app.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match app.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
