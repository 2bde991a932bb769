use std::path::PathBuf;
use std::sync::Arc;

use crate::error::OutputError;
use crate::noop_sink::NoopSink;
use crate::sink::{FileSink, LogSink, StderrSink, StdoutSink};

/// Output destinations that can be selected by name from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    Stderr,
    Discard,
    File(PathBuf),
}

/// Parse an output name into a target.
///
/// Examples:
/// - "stdout" / "-"
/// - "stderr"
/// - "discard" / "none" / "null"
/// - "/var/log/app.log" (anything else is treated as a file path)
pub fn parse_output(target: &str) -> Result<OutputTarget, OutputError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(OutputError::EmptyTarget);
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "stdout" | "-" => Ok(OutputTarget::Stdout),
        "stderr" => Ok(OutputTarget::Stderr),
        "discard" | "none" | "null" => Ok(OutputTarget::Discard),
        _ => Ok(OutputTarget::File(PathBuf::from(trimmed))),
    }
}

/// Create a concrete [`LogSink`] for a target.
///
/// Only file targets can fail, when the file cannot be opened for appending.
pub fn make_sink(target: &OutputTarget) -> Result<Arc<dyn LogSink>, OutputError> {
    match target {
        OutputTarget::Stdout => Ok(Arc::new(StdoutSink)),
        OutputTarget::Stderr => Ok(Arc::new(StderrSink)),
        OutputTarget::Discard => Ok(Arc::new(NoopSink)),
        OutputTarget::File(path) => {
            let sink = FileSink::append(path).map_err(|source| OutputError::OpenFile {
                path: path.clone(),
                source,
            })?;
            Ok(Arc::new(sink))
        }
    }
}
