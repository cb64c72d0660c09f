//! Fluent construction of a single entry
//!
//! A thin chain over [`LogOptions`]; nothing is captured until `.log()`.

use super::log_context::{FieldValue, LogFields};
use super::log_level::LogLevel;
use super::logger::{LogOptions, Logger};
use super::payload::LogPayload;
use serde::Serialize;

/// Accumulates message, payload and fields for one `log_with` call
///
/// # Example
///
/// ```
/// use rust_log_inspector::prelude::*;
///
/// let logger = Logger::builder().console_output(false).build().unwrap();
///
/// logger.info_builder()
///     .message("fetch resolved")
///     .category("Network")
///     .field("status", 200)
///     .field("duration_ms", 18.4)
///     .tag("xhr")
///     .log();
///
/// assert_eq!(logger.logs()[0].message, "fetch resolved");
/// ```
#[must_use = "the entry is only recorded by calling .log()"]
pub struct StructuredLogBuilder<'a> {
    logger: &'a Logger,
    level: LogLevel,
    message: String,
    options: LogOptions,
}

impl<'a> StructuredLogBuilder<'a> {
    pub fn new(logger: &'a Logger, level: LogLevel) -> Self {
        Self {
            logger,
            level,
            message: String::new(),
            options: LogOptions::default(),
        }
    }

    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    /// Per-call field; wins over global and trace fields
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.options = self.options.field(key, value);
        self
    }

    pub fn fields(mut self, fields: LogFields) -> Self {
        self.options = self.options.fields(fields);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.options = self.options.category(category);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.options = self.options.tag(tag);
        self
    }

    pub fn data(mut self, data: LogPayload) -> Self {
        self.options = self.options.data(data);
        self
    }

    /// Attach any serializable value as the payload
    pub fn data_value<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.options = self.options.data_value(value);
        self
    }

    pub fn error<E: std::error::Error + ?Sized>(mut self, err: &E) -> Self {
        self.options = self.options.error(err);
        self
    }

    pub fn context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options = self.options.context_value(key, value);
        self
    }

    /// Hand the entry to the engine; level filtering still applies
    pub fn log(self) {
        self.logger.log_with(self.level, self.message, self.options);
    }
}

impl Logger {
    /// Structured builder at an arbitrary level
    pub fn builder_at(&self, level: LogLevel) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, level)
    }

    pub fn trace_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Trace)
    }

    pub fn debug_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Debug)
    }

    pub fn info_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Info)
    }

    pub fn warn_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Warn)
    }

    /// Error-level builder; pair with `.error(&err)` to attach a fault payload
    ///
    /// ```
    /// use rust_log_inspector::Logger;
    ///
    /// let logger = Logger::builder().console_output(false).build().unwrap();
    /// let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "socket reset");
    /// logger.error_builder()
    ///     .message("bridge dropped")
    ///     .field("attempt", 2)
    ///     .error(&err)
    ///     .log();
    /// assert!(logger.logs()[0].data.is_some());
    /// ```
    pub fn error_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Error)
    }

    pub fn fatal_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Fatal)
    }
}
