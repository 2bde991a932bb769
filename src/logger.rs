use std::fmt::{self, Display};
use std::panic::Location;
use std::sync::Arc;

use serde_json::Value;

use crate::caller;
use crate::context::{current_request_context, ContextCarrier, CONTEXT_KEYS};
use crate::error::OutputError;
use crate::format::RenderStrategy;
use crate::level::Severity;
use crate::record::{Fields, LogRecord};
use crate::sink::{LogSink, StdoutSink};

/// Construction parameters for a [`Logger`].
///
/// **Fields**
/// - `level`: minimum severity name, parsed with [`Severity::parse`].
/// - `format`: render format name, parsed with [`RenderStrategy::parse`].
/// - `output`: destination for rendered lines; `None` means stdout.
/// - `caller_skip`: extra frames to skip when resolving the caller, for
///   code that wraps the logger in its own helpers.
#[derive(Clone)]
pub struct LoggerConfig {
    pub level: String,
    pub format: String,
    pub output: Option<Arc<dyn LogSink>>,
    pub caller_skip: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            output: None,
            caller_skip: 0,
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("level", &self.level)
            .field("format", &self.format)
            .field("output", &self.output.as_ref().map(|_| "<sink>"))
            .field("caller_skip", &self.caller_skip)
            .finish()
    }
}

/// Leveled structured logger.
///
/// Cloning is cheap and every derivation (`with_field`, `with_fields`,
/// `with_context`) returns a new logger with its own copy of the field
/// mapping, so a root logger can be shared across threads and derived from
/// concurrently without locking. The sink is shared by all derivations and
/// must serialise writes itself.
#[derive(Clone)]
pub struct Logger {
    threshold: Severity,
    strategy: RenderStrategy,
    sink: Arc<dyn LogSink>,
    fields: Arc<Fields>,
    caller_skip: usize,
}

impl Logger {
    /// Build a logger from configuration. Unknown level or format names fall
    /// back to INFO and structured output.
    pub fn new(config: LoggerConfig) -> Self {
        Logger {
            threshold: Severity::parse(&config.level),
            strategy: RenderStrategy::parse(&config.format),
            sink: config.output.unwrap_or_else(|| Arc::new(StdoutSink)),
            fields: Arc::new(Fields::new()),
            caller_skip: config.caller_skip,
        }
    }

    /// Build a logger from the `LOG_*` environment variables.
    pub fn from_env() -> Result<Self, OutputError> {
        Ok(Logger::new(LoggerConfig::from_env()?))
    }

    /// Logger writing INFO and above as JSON to `sink`.
    pub fn for_sink(sink: Arc<dyn LogSink>) -> Self {
        Logger::new(LoggerConfig {
            output: Some(sink),
            ..LoggerConfig::default()
        })
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    pub fn caller_skip(&self) -> usize {
        self.caller_skip
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Fields attached to every record this logger emits.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn set_threshold(&mut self, threshold: Severity) {
        self.threshold = threshold;
    }

    pub fn set_strategy(&mut self, strategy: RenderStrategy) {
        self.strategy = strategy;
    }

    pub fn set_sink(&mut self, sink: Arc<dyn LogSink>) {
        self.sink = sink;
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Severity) -> bool {
        level >= self.threshold
    }

    /// Derive a logger with `key` set to `value`, replacing any previous
    /// value for that key. The receiver is left untouched.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Logger {
        self.derive(|fields| {
            fields.insert(key.into(), value.into());
        })
    }

    /// Derive a logger with every entry merged in; later entries win over
    /// earlier ones and over existing fields with the same key.
    pub fn with_fields<I, K, V>(&self, entries: I) -> Logger
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.derive(|fields| {
            for (key, value) in entries {
                fields.insert(key.into(), value.into());
            }
        })
    }

    /// Derive a logger carrying `request_id` and `user_id` from `carrier`.
    /// Keys the carrier does not have are skipped.
    pub fn with_context<C: ContextCarrier + ?Sized>(&self, carrier: &C) -> Logger {
        self.derive(|fields| {
            for key in CONTEXT_KEYS {
                if let Some(value) = carrier.lookup(key) {
                    fields.insert(key.to_string(), value);
                }
            }
        })
    }

    /// [`Logger::with_context`] applied to the task-local request context,
    /// or a plain copy outside any request scope.
    pub fn with_current_context(&self) -> Logger {
        match current_request_context() {
            Some(ctx) => self.with_context(&ctx),
            None => self.clone(),
        }
    }

    fn derive(&self, apply: impl FnOnce(&mut Fields)) -> Logger {
        let mut fields = (*self.fields).clone();
        apply(&mut fields);
        Logger {
            threshold: self.threshold,
            strategy: self.strategy,
            sink: Arc::clone(&self.sink),
            fields: Arc::new(fields),
            caller_skip: self.caller_skip,
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl Display) {
        self.emit(Severity::Debug, message, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: impl Display) {
        self.emit(Severity::Info, message, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, message: impl Display) {
        self.emit(Severity::Warn, message, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, message: impl Display) {
        self.emit(Severity::Error, message, Location::caller());
    }

    /// Emit at an explicit severity. Unlike [`Logger::fatal`], a FATAL
    /// record written here does not end the process.
    #[track_caller]
    pub fn log(&self, level: Severity, message: impl Display) {
        self.emit(level, message, Location::caller());
    }

    /// Emit at FATAL, flush the sink and exit the process with status 1.
    ///
    /// This is a process lifecycle decision; library code should return an
    /// error instead and leave the call to the binary's entry point.
    #[track_caller]
    pub fn fatal(&self, message: impl Display) -> ! {
        self.emit(Severity::Fatal, message, Location::caller());
        let _ = self.sink.flush();
        std::process::exit(1)
    }

    fn emit(&self, level: Severity, message: impl Display, location: &Location<'_>) {
        self.write_record(level, message, || caller::capture(location, self.caller_skip));
    }

    /// Threshold check, render and write. `resolve_caller` only runs when the
    /// record qualifies for caller information.
    pub(crate) fn write_record(
        &self,
        level: Severity,
        message: impl Display,
        resolve_caller: impl FnOnce() -> Option<String>,
    ) {
        if !self.enabled(level) {
            return;
        }

        let caller = if self.wants_caller(level) {
            resolve_caller()
        } else {
            None
        };
        let record = LogRecord::new(level, message.to_string(), &self.fields).with_caller(caller);

        let mut line = self.strategy.render(&record);
        line.push('\n');
        // Sink failures are deliberately not surfaced to the caller.
        let _ = self.sink.write_line(line.as_bytes());
    }

    fn wants_caller(&self, level: Severity) -> bool {
        level >= Severity::Error || self.threshold == Severity::Debug
    }
}

impl Default for Logger {
    /// INFO threshold, structured output, stdout.
    fn default() -> Self {
        Logger::new(LoggerConfig::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .field("strategy", &self.strategy)
            .field("fields", &self.fields)
            .field("caller_skip", &self.caller_skip)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::sink::MemorySink;
    use serde_json::json;
    use std::collections::HashMap;
    use std::thread;

    const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    fn capture(level: &str, format: &str) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::new(LoggerConfig {
            level: level.to_string(),
            format: format.to_string(),
            output: Some(Arc::new(sink.clone())),
            caller_skip: 0,
        });
        (logger, sink)
    }

    fn parsed(sink: &MemorySink) -> Vec<Value> {
        sink.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn emits_iff_level_reaches_threshold() {
        for threshold in ALL {
            for level in ALL {
                let (mut logger, sink) = capture("info", "json");
                logger.set_threshold(threshold);
                logger.log(level, "probe");
                let written = sink.lines().len();
                assert_eq!(
                    written,
                    usize::from(level >= threshold),
                    "threshold {threshold}, level {level}"
                );
            }
        }
    }

    #[test]
    fn filtered_records_are_never_formatted() {
        struct Explodes;
        impl Display for Explodes {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted a dropped record")
            }
        }

        let (logger, sink) = capture("warn", "text");
        logger.info(Explodes);
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn formats_arguments_into_message() {
        let (logger, sink) = capture("info", "json");
        logger.info(format_args!("user {} logged in from {}", 42, "10.0.0.1"));
        logger.info("100% verbatim {}");

        let records = parsed(&sink);
        assert_eq!(records[0]["message"], "user 42 logged in from 10.0.0.1");
        assert_eq!(records[1]["message"], "100% verbatim {}");
    }

    #[test]
    fn derivation_leaves_receiver_untouched() {
        let (root, sink) = capture("info", "json");
        let derived = root.with_field("component", "auth");
        let _ = root.with_fields([("a", 1), ("b", 2)]);
        let _ = root.with_context(&RequestContext::new("req-1"));

        root.info("from root");
        derived.info("from derived");

        let records = parsed(&sink);
        assert!(records[0].get("fields").is_none());
        assert_eq!(records[1]["fields"], json!({"component": "auth"}));
        assert!(root.fields().is_empty());
    }

    #[test]
    fn later_fields_take_precedence() {
        let (logger, sink) = capture("info", "json");
        logger.with_fields([("a", 1)]).with_field("a", 2).info("x");
        logger.with_fields([("b", 1), ("b", 3)]).info("y");

        let records = parsed(&sink);
        assert_eq!(records[0]["fields"]["a"], 2);
        assert_eq!(records[1]["fields"]["b"], 3);
    }

    #[test]
    fn context_copies_only_present_keys() {
        let (logger, sink) = capture("info", "json");
        let mut carrier = HashMap::new();
        carrier.insert("request_id".to_string(), json!("req-5"));
        carrier.insert("tenant".to_string(), json!("acme"));

        logger.with_context(&carrier).info("handled");
        logger.with_context(&HashMap::<String, Value>::new()).info("bare");

        let records = parsed(&sink);
        assert_eq!(records[0]["fields"], json!({"request_id": "req-5"}));
        assert!(records[1].get("fields").is_none());
    }

    #[tokio::test]
    async fn current_context_is_picked_up_inside_scope() {
        let (logger, sink) = capture("info", "json");
        let ctx = RequestContext::new("req-77").with_user("u-3");
        crate::context::with_request_context(ctx, async {
            logger.with_current_context().info("inside");
        })
        .await;
        logger.with_current_context().info("outside");

        let records = parsed(&sink);
        assert_eq!(records[0]["fields"], json!({"request_id": "req-77", "user_id": "u-3"}));
        assert!(records[1].get("fields").is_none());
    }

    #[test]
    fn caller_follows_level_and_threshold() {
        let (logger, sink) = capture("info", "json");
        logger.info("no caller");
        logger.warn("no caller either");
        logger.error("with caller");

        let (debug_logger, debug_sink) = capture("debug", "json");
        debug_logger.debug("debug caller");
        debug_logger.info("info caller");

        let records = parsed(&sink);
        assert!(records[0].get("caller").is_none());
        assert!(records[1].get("caller").is_none());
        let caller = records[2]["caller"].as_str().unwrap();
        assert!(caller.starts_with("logger.rs:"), "{caller}");

        for record in parsed(&debug_sink) {
            assert!(record["caller"].as_str().unwrap().starts_with("logger.rs:"));
        }
    }

    #[test]
    fn caller_points_at_call_site() {
        let (logger, sink) = capture("info", "json");
        let line = line!() + 1;
        logger.error("boom");
        assert_eq!(parsed(&sink)[0]["caller"], format!("logger.rs:{line}"));
    }

    #[test]
    fn text_strategy_renders_fields() {
        let (logger, sink) = capture("info", "TEXT");
        logger.with_field("port", 8080).info("listening");

        let line = &sink.lines()[0];
        assert!(line.ends_with(" [INFO] listening {port=8080}"), "{line}");
    }

    #[test]
    fn setters_change_only_the_receiver() {
        let (root, sink) = capture("info", "json");
        let mut quiet = root.with_field("k", "v");
        quiet.set_threshold(Severity::Error);
        quiet.set_strategy(RenderStrategy::Text);

        quiet.warn("suppressed");
        root.warn("kept");
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(root.threshold(), Severity::Info);
        assert_eq!(root.strategy(), RenderStrategy::Structured);

        let other = MemorySink::new();
        quiet.set_sink(Arc::new(other.clone()));
        quiet.error("moved");
        assert_eq!(other.lines().len(), 1);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn unknown_configuration_uses_defaults() {
        let (logger, _) = capture("verbose", "xml");
        assert_eq!(logger.threshold(), Severity::Info);
        assert_eq!(logger.strategy(), RenderStrategy::Structured);

        let logger = Logger::default();
        assert_eq!(logger.threshold(), Severity::Info);
        assert_eq!(logger.strategy(), RenderStrategy::Structured);
        assert_eq!(logger.caller_skip(), 0);
    }

    #[test]
    fn concurrent_emission_yields_whole_lines() {
        let (logger, sink) = capture("info", "json");
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let logger = logger.with_field("worker", i);
                thread::spawn(move || logger.info(format_args!("message {i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = parsed(&sink);
        assert_eq!(records.len(), 100);
        let mut workers: Vec<i64> = records
            .iter()
            .map(|r| r["fields"]["worker"].as_i64().unwrap())
            .collect();
        workers.sort_unstable();
        assert_eq!(workers, (0..100).collect::<Vec<_>>());
    }
}
