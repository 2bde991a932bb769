use std::path::PathBuf;

/// Error type returned when resolving a configured output target into a sink.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("log output target is empty")]
    EmptyTarget,

    #[error("failed to open log output file {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error type returned when a record cannot be encoded in structured form.
///
/// Never escapes the logger: the record is rendered as text instead.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("structured encoding failed: {0}")]
    Structured(#[from] serde_json::Error),
}
