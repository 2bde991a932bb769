//! Byte-stream adapter over a [`Logger`].
//!
//! Code that only knows how to write text to an [`io::Write`], including
//! `tracing_subscriber::fmt` through [`MakeWriter`], can use the logger as
//! its destination. Each `write` call becomes one INFO record.

use std::io;

use tracing_subscriber::fmt::MakeWriter;

use crate::level::Severity;
use crate::logger::Logger;
use crate::sink::LogSink;

/// Writer that forwards every chunk it receives as an INFO message.
///
/// A single trailing line terminator is stripped so the forwarded message
/// does not break the one-record-per-line output.
#[derive(Debug, Clone)]
pub struct LoggerWriter {
    logger: Logger,
}

impl LoggerWriter {
    pub fn new(logger: Logger) -> Self {
        LoggerWriter { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Logger {
    /// Adapt this logger into a byte-stream writer.
    pub fn writer(&self) -> LoggerWriter {
        LoggerWriter::new(self.clone())
    }
}

impl io::Write for LoggerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let message = text
            .strip_suffix('\n')
            .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
            .unwrap_or(&*text);
        self.logger.log(Severity::Info, message);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.logger.sink().flush()
    }
}

impl<'a> MakeWriter<'a> for LoggerWriter {
    type Writer = LoggerWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use serde_json::Value;
    use std::io::Write;
    use std::sync::Arc;

    fn messages(sink: &MemorySink) -> Vec<String> {
        sink.lines()
            .iter()
            .map(|line| {
                let value: Value = serde_json::from_str(line).unwrap();
                assert_eq!(value["level"], "INFO");
                value["message"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn each_write_becomes_one_info_record() {
        let sink = MemorySink::new();
        let mut writer = Logger::for_sink(Arc::new(sink.clone())).writer();

        writer.write_all(b"connection reset\n").unwrap();
        writer
            .write_all(format!("retrying in {}s\r\n", 5).as_bytes())
            .unwrap();
        writer.write_all(b"no newline").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            messages(&sink),
            vec!["connection reset", "retrying in 5s", "no newline"]
        );
    }

    #[test]
    fn derived_fields_travel_with_the_writer() {
        let sink = MemorySink::new();
        let logger = Logger::for_sink(Arc::new(sink.clone())).with_field("component", "legacy");
        let mut writer = logger.writer();
        writer.write_all(b"hello\n").unwrap();

        let value: Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(value["fields"]["component"], "legacy");
    }

    #[test]
    fn serves_as_fmt_subscriber_destination() {
        let sink = MemorySink::new();
        let writer = Logger::for_sink(Arc::new(sink.clone())).writer();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("cache warmed");
        });

        let logged = messages(&sink);
        assert_eq!(logged.len(), 1);
        assert!(logged[0].contains("cache warmed"), "{}", logged[0]);
    }
}
