//! Leveled structured logging for service processes.
//!
//! A [`Logger`] holds a severity threshold, a render strategy (JSON or
//! text), a shared [`LogSink`], a set of contextual fields and a caller-skip
//! offset. Deriving a logger with extra fields copies the field mapping and
//! never touches the original, so a root logger can be shared freely across
//! threads. A process-wide default lives in [`global`], an HTTP middleware
//! in `http` (feature `http`), and [`LoggerWriter`] / [`LoggerLayer`] plug the
//! logger into byte-stream and `tracing` consumers.

pub mod level;
pub mod format;
pub mod record;
pub mod caller;
pub mod sink;
pub mod noop_sink;
pub mod output;
pub mod env;
pub mod error;
pub mod context;
pub mod logger;
pub mod global;
pub mod writer;
pub mod layer;

#[cfg(feature = "http")]
pub mod http;

mod macros;

pub use context::{ContextCarrier, RequestContext};
pub use format::RenderStrategy;
pub use global::{global_logger, set_global_logger};
pub use layer::LoggerLayer;
pub use level::Severity;
pub use logger::{Logger, LoggerConfig};
pub use record::{Fields, LogRecord};
pub use sink::{LogSink, MemorySink};
pub use writer::LoggerWriter;

#[cfg(feature = "http")]
pub use http::HttpLogLayer;
