use crate::level::Severity;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Contextual key/value payload attached to records.
pub type Fields = BTreeMap<String, serde_json::Value>;

/// Wall-clock layout used for every rendered timestamp (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Snapshot of a single logging event.
///
/// Built once per emitted call and never mutated afterwards. The field
/// mapping is borrowed from the emitting logger rather than copied.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord<'a> {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "no_fields")]
    pub fields: &'a Fields,
}

impl<'a> LogRecord<'a> {
    pub fn new(level: Severity, message: String, fields: &'a Fields) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level,
            message,
            caller: None,
            fields,
        }
    }

    pub fn with_caller(mut self, caller: Option<String>) -> Self {
        self.caller = caller;
        self
    }

    /// Timestamp rendered with [`TIMESTAMP_FORMAT`].
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn no_fields(fields: &&Fields) -> bool {
    fields.is_empty()
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}
