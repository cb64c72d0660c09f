//! Log entry structure

use super::log_context::LogFields;
use super::log_level::LogLevel;
use super::payload::LogPayload;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence used to keep ids distinct within one millisecond
static ENTRY_SEQUENCE: AtomicU64 = AtomicU64::new(0);

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 6;

/// Generate a process-unique entry id: `{millis}-{sequence}-{random}`
pub fn next_entry_id(timestamp_ms: i64) -> String {
    let seq = ENTRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", timestamp_ms, seq, suffix)
}

/// Best-effort provenance of a log call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// One captured log event
///
/// Built with [`LogEntry::new`] and the consuming `with_*` methods; once
/// handed to the engine it is shared immutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LogPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<LogFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        Self {
            id: next_entry_id(timestamp),
            timestamp,
            level,
            message: message.into(),
            data: None,
            fields: None,
            context: None,
            stack: None,
            source: None,
            category: None,
            tags: None,
        }
    }

    /// Attach a payload; fault payloads also populate `stack`
    pub fn with_data(mut self, data: LogPayload) -> Self {
        if let Some(trace) = data.trace() {
            self.stack = Some(trace.to_string());
        }
        self.data = Some(data);
        self
    }

    /// Attach structured fields; an empty set leaves `fields` absent
    pub fn with_fields(mut self, fields: LogFields) -> Self {
        self.fields = if fields.is_empty() { None } else { Some(fields) };
        self
    }

    pub fn with_context(mut self, context: serde_json::Map<String, serde_json::Value>) -> Self {
        self.context = if context.is_empty() { None } else { Some(context) };
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = if tags.is_empty() { None } else { Some(tags) };
        self
    }

    /// Capture time as a UTC datetime
    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Capture time formatted as ISO 8601 with milliseconds
    pub fn iso_timestamp(&self) -> String {
        self.datetime().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    /// Size of the JSON encoding in bytes
    pub fn serialized_size(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(0)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}
