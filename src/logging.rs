//! Process-wide logger bootstrap.
//!
//! # Invariants
//! - The backend is started at most once per process.
//! - Re-initialization with the same level is a no-op; a different level is rejected.
//! - Initialization never panics.

use flexi_logger::{Logger, LoggerHandle};
use log::info;
use once_cell::sync::OnceCell;

use crate::error::{Error, Result};

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Starts logging to stderr at `level`.
///
/// # Errors
/// - Unsupported level names.
/// - A second call with a different level.
/// - Backend startup failure.
pub fn init_logging(level: &str) -> Result<()> {
    let level = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState> {
        let logger = Logger::try_with_str(level)
            .map_err(|err| Error::Logging(format!("invalid log level `{level}`: {err}")))?
            .log_to_stderr()
            .format(flexi_logger::default_format)
            .start()
            .map_err(|err| Error::Logging(format!("failed to start logger: {err}")))?;

        info!(
            "event=app_start module=core status=ok version={} level={}",
            env!("CARGO_PKG_VERSION"),
            level
        );

        Ok(LoggingState {
            level,
            _logger: logger,
        })
    })?;

    if state.level != level {
        return Err(Error::Logging(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        )));
    }
    Ok(())
}

/// Active level, or `None` before [`init_logging`].
pub fn logging_level() -> Option<&'static str> {
    LOGGING_STATE.get().map(|state| state.level)
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(Error::Logging(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("TRACE").unwrap(), "trace");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert_eq!(normalize_level("off").unwrap(), "off");
    }

    #[test]
    fn normalize_level_rejects_unknown_values() {
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn init_is_idempotent_for_same_level() {
        init_logging("warn").unwrap();
        init_logging("WARN").unwrap();
        assert_eq!(logging_level(), Some("warn"));
        assert!(init_logging("trace").is_err());
    }
}
