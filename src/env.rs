//! Environment variable names used by this crate for convenient
//! configuration of loggers from service processes.
//!
//! These are purely helpers; [`Logger::new`](crate::logger::Logger::new)
//! itself never reads the environment.

use crate::error::OutputError;
use crate::logger::LoggerConfig;
use crate::output::{make_sink, parse_output};

/// Minimum severity name, e.g. `debug` or `warning`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Render format name: `json`, `text` or `plain`.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Output target: `stdout`, `stderr`, `discard` or a file path.
pub const LOG_OUTPUT_ENV: &str = "LOG_OUTPUT";

/// Extra caller frames to skip for wrapped loggers.
pub const LOG_CALLER_SKIP_ENV: &str = "LOG_CALLER_SKIP";

/// Read an environment variable or fall back to a provided default.
/// Empty values count as unset.
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Read an environment variable as an unsigned integer, falling back to
/// `default` when it is unset or does not parse.
pub fn env_usize_or(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl LoggerConfig {
    /// Build a configuration from `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT` and
    /// `LOG_CALLER_SKIP`.
    ///
    /// **Returns**
    /// - `Err(OutputError::OpenFile)` if `LOG_OUTPUT` names a file that cannot
    ///   be opened for appending. Every other value has a default.
    pub fn from_env() -> Result<Self, OutputError> {
        let target = parse_output(&env_or(LOG_OUTPUT_ENV, "stdout"))?;
        Ok(LoggerConfig {
            level: env_or(LOG_LEVEL_ENV, "info"),
            format: env_or(LOG_FORMAT_ENV, "json"),
            output: Some(make_sink(&target)?),
            caller_skip: env_usize_or(LOG_CALLER_SKIP_ENV, 0),
        })
    }
}
