//! Encoders turning a finished entry into bytes
//!
//! Provides:
//! - `JsonEncoder`: one JSON object per entry, keys sorted, with a `decode`
//!   counterpart
//! - `ConsoleEncoder`: human-readable single line with optional colours
//!
//! Encoders are pure: the same entry always yields the same bytes and the
//! entry is never modified.

use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::field::format_fields;
use super::timestamp::TimestampFormat;

/// Capability turning an [`Entry`] into a byte sequence
pub trait Encoder: Send + Sync {
    fn encode(&self, entry: &Entry) -> Result<Vec<u8>>;

    fn name(&self) -> &str {
        "encoder"
    }
}

/// Machine-readable encoder
///
/// Example: `{"fields":{"user":"u"},"level":"INFO","msg":"Request processed","time":"2025-01-08T10:30:45.123456000Z"}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonEncoder {
    timestamp_format: TimestampFormat,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    /// Build the JSON object for an entry
    ///
    /// # Errors
    ///
    /// Fails when the timestamp format cannot be rendered.
    pub fn to_json_value(&self, entry: &Entry) -> Result<serde_json::Value> {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "time".to_string(),
            self.timestamp_format.to_json_value(&entry.time)?,
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(entry.level.to_str().to_string()),
        );
        json_obj.insert(
            "msg".to_string(),
            serde_json::Value::String(entry.message.clone()),
        );

        if !entry.fields.is_empty() {
            let mut keys: Vec<&String> = entry.fields.keys().collect();
            keys.sort();
            let mut fields = serde_json::Map::new();
            for key in keys {
                fields.insert(key.clone(), entry.fields[key].to_json_value());
            }
            json_obj.insert("fields".to_string(), serde_json::Value::Object(fields));
        }

        if let Some(ref caller) = entry.caller {
            json_obj.insert("caller".to_string(), serde_json::Value::String(caller.clone()));
        }
        if let Some(ref trace_id) = entry.trace_id {
            json_obj.insert(
                "trace_id".to_string(),
                serde_json::Value::String(trace_id.clone()),
            );
        }
        if let Some(ref span_id) = entry.span_id {
            json_obj.insert(
                "span_id".to_string(),
                serde_json::Value::String(span_id.clone()),
            );
        }

        Ok(serde_json::Value::Object(json_obj))
    }

    /// Decode one encoded line back into an entry.
    ///
    /// Works for the string timestamp formats that carry a full date and
    /// offset (`Rfc3339`, `Rfc3339Nano`, `Iso8601`, `Iso8601Micros`).
    pub fn decode(&self, bytes: &[u8]) -> Result<Entry> {
        let end = bytes
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        let entry = serde_json::from_slice(&bytes[..end])?;
        Ok(entry)
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, entry: &Entry) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.to_json_value(entry)?)
            .map_err(|e| LoggerError::encode("json", e.to_string()))
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Human-readable encoder
///
/// Example: `10:30:45 [INFO] Request processed latency_ms=42 user=u (src/main.rs:10)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEncoder {
    timestamp_format: TimestampFormat,
    use_colors: bool,
}

impl ConsoleEncoder {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::TimeOnly,
            use_colors: false,
        }
    }

    /// Full RFC 3339 timestamps instead of wall-clock time only
    #[must_use]
    pub fn with_full_timestamp(mut self, full: bool) -> Self {
        self.timestamp_format = if full {
            TimestampFormat::Rfc3339
        } else {
            TimestampFormat::TimeOnly
        };
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn level_str(&self, entry: &Entry) -> String {
        #[cfg(feature = "console")]
        if self.use_colors {
            use colored::Colorize;
            return entry
                .level
                .to_str()
                .color(entry.level.color_code())
                .to_string();
        }

        entry.level.to_str().to_string()
    }

    /// Format as a single text line (no trailing newline)
    pub fn format_line(&self, entry: &Entry) -> Result<String> {
        let mut line = format!(
            "{} [{}] {}",
            self.timestamp_format.format(&entry.time)?,
            self.level_str(entry),
            entry.message
        );

        if !entry.fields.is_empty() {
            line.push(' ');
            line.push_str(&format_fields(&entry.fields));
        }
        if let Some(ref trace_id) = entry.trace_id {
            line.push_str(&format!(" trace_id={}", trace_id));
        }
        if let Some(ref span_id) = entry.span_id {
            line.push_str(&format!(" span_id={}", span_id));
        }
        if let Some(ref caller) = entry.caller {
            line.push_str(&format!(" ({})", caller));
        }

        Ok(line)
    }
}

impl Default for ConsoleEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for ConsoleEncoder {
    fn encode(&self, entry: &Entry) -> Result<Vec<u8>> {
        Ok(self.format_line(entry)?.into_bytes())
    }

    fn name(&self) -> &str {
        "console"
    }
}
