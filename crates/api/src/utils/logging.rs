use std::time::Duration;

use talkreport_domain::TalkReportError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to every
/// target. `json` switches to one JSON object per line.
pub fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = if json { builder.json().try_init() } else { builder.try_init() };
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a stable identifier such as `"send::bulk"`; never pass
/// report content or tokens in it.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&TalkReportError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => {
            warn!(command, duration_ms, error_type = error_label(err), "command_execution_failure");
        }
    }
}

/// Convert a `TalkReportError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &TalkReportError) -> &'static str {
    match error {
        TalkReportError::Database(_) => "database",
        TalkReportError::Config(_) => "config",
        TalkReportError::Network(_) => "network",
        TalkReportError::Auth(_) => "auth",
        TalkReportError::Credentials(_) => "credentials",
        TalkReportError::Export(_) => "export",
        TalkReportError::NotFound(_) => "not_found",
        TalkReportError::InvalidInput(_) => "invalid_input",
        TalkReportError::Internal(_) => "internal",
    }
}
