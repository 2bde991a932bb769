use crate::error::RenderError;
use crate::record::LogRecord;
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Encoding applied to a [`LogRecord`] before it reaches the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderStrategy {
    /// One JSON object per line.
    #[default]
    Structured,
    /// One space-joined human-readable line.
    Text,
}

impl RenderStrategy {
    /// Parse a format name: `"json"` selects [`RenderStrategy::Structured`],
    /// `"text"` and `"plain"` select [`RenderStrategy::Text`]. Matching is
    /// case-insensitive and anything else falls back to structured output.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "json" => RenderStrategy::Structured,
            "text" | "plain" => RenderStrategy::Text,
            _ => RenderStrategy::Structured,
        }
    }

    /// Render a record into a single line without the trailing newline.
    ///
    /// Structured rendering never loses a record: if encoding fails the
    /// record is rendered as text instead.
    pub fn render(&self, record: &LogRecord<'_>) -> String {
        match self {
            RenderStrategy::Structured => {
                render_structured(record).unwrap_or_else(|_| render_text(record))
            }
            RenderStrategy::Text => render_text(record),
        }
    }
}

impl fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStrategy::Structured => f.write_str("json"),
            RenderStrategy::Text => f.write_str("text"),
        }
    }
}

impl FromStr for RenderStrategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RenderStrategy::parse(s))
    }
}

/// Encode a record as a compact JSON object.
pub fn render_structured(record: &LogRecord<'_>) -> Result<String, RenderError> {
    Ok(serde_json::to_string(record)?)
}

/// Encode a record as `timestamp [LEVEL] (caller) message {k=v, ...}`.
///
/// The caller and field tokens are omitted when absent or empty.
pub fn render_text(record: &LogRecord<'_>) -> String {
    let mut parts = Vec::with_capacity(5);
    parts.push(record.timestamp_text());
    parts.push(format!("[{}]", record.level));
    if let Some(caller) = &record.caller {
        parts.push(format!("({caller})"));
    }
    parts.push(record.message.clone());

    if !record.fields.is_empty() {
        let pairs: Vec<String> = record
            .fields
            .iter()
            .map(|(key, value)| format!("{key}={}", text_value(value)))
            .collect();
        parts.push(format!("{{{}}}", pairs.join(", ")));
    }

    parts.join(" ")
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
