use std::time::Duration;

use classbatch_domain::{ClassBatchError, LogFormat, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Output goes to stderr: stdout carries native-messaging frames. `RUST_LOG`
/// wins over the configured level.
///
/// # Errors
/// `Config` for an unparsable level, `Internal` if a subscriber is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ClassBatchError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            ClassBatchError::Config(format!("invalid logging.level {:?}: {e}", config.level))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(false).try_init(),
    };
    installed.map_err(|e| ClassBatchError::Internal(format!("failed to install logger: {e}")))
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    outcome: Result<(), &ClassBatchError>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(()) => info!(command, duration_ms, "command_execution_success"),
        Err(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Stable label for an error, suitable for log fields.
#[inline]
pub fn error_label(error: &ClassBatchError) -> &'static str {
    match error {
        ClassBatchError::Auth(_) => "auth",
        ClassBatchError::Api { .. } => "api",
        ClassBatchError::Upload(_) => "upload",
        ClassBatchError::Network(_) => "network",
        ClassBatchError::InvalidInput(_) => "invalid_input",
        ClassBatchError::InvalidResponse(_) => "invalid_response",
        ClassBatchError::Config(_) => "config",
        ClassBatchError::Internal(_) => "internal",
    }
}
