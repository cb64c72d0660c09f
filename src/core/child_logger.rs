//! Loggers with pre-bound category, fields, tags and context
//!
//! A [`ChildLogger`] is immutable: every `with_*` call returns a new value
//! and leaves the receiver untouched. On each leveled call the bound values
//! sit underneath the call-site values:
//!
//! - fields: call-site keys win
//! - tags: bound tags first, then call-site tags, duplicates dropped
//! - context: call-site keys win
//! - category: the call-site category replaces the bound one

use super::log_context::{FieldValue, LogFields};
use super::log_level::LogLevel;
use super::logger::{LogOptions, Logger};

#[derive(Debug, Clone)]
pub struct ChildLogger {
    logger: Logger,
    category: Option<String>,
    fields: LogFields,
    tags: Vec<String>,
    context: serde_json::Map<String, serde_json::Value>,
}

impl ChildLogger {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            category: None,
            fields: LogFields::new(),
            tags: Vec::new(),
            context: serde_json::Map::new(),
        }
    }

    /// Bind additional fields; new values replace bound ones with the same key
    #[must_use]
    pub fn with_fields(&self, fields: LogFields) -> Self {
        let mut next = self.clone();
        next.fields.extend_from(&fields);
        next
    }

    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut next = self.clone();
        next.fields.add_field(key, value);
        next
    }

    #[must_use]
    pub fn with_category(&self, category: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.category = Some(category.into());
        next
    }

    #[must_use]
    pub fn with_tags<I, S>(&self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.tags = merge_tags(&self.tags, tags.into_iter().map(Into::into));
        next
    }

    #[must_use]
    pub fn with_context(&self, context: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut next = self.clone();
        next.context.extend(context);
        next
    }

    /// Nested logger whose category is `parent:sub`
    #[must_use]
    pub fn child(&self, sub: &str) -> Self {
        let category = match self.category {
            Some(ref parent) => format!("{}:{}", parent, sub),
            None => sub.to_string(),
        };
        self.with_category(category)
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn fields(&self) -> &LogFields {
        &self.fields
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_with(level, message, LogOptions::default());
    }

    pub fn log_with(&self, level: LogLevel, message: impl Into<String>, options: LogOptions) {
        self.logger.log_with(level, message, self.merge(options));
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    fn merge(&self, options: LogOptions) -> LogOptions {
        let mut fields = self.fields.clone();
        if let Some(ref call_fields) = options.fields {
            fields.extend_from(call_fields);
        }

        let mut context = self.context.clone();
        context.extend(options.context);

        LogOptions {
            data: options.data,
            fields: if fields.is_empty() { None } else { Some(fields) },
            category: options.category.or_else(|| self.category.clone()),
            tags: merge_tags(&self.tags, options.tags),
            context,
        }
    }
}

fn merge_tags(bound: &[String], extra: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut tags = bound.to_vec();
    for tag in extra {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

impl Logger {
    /// Child logger bound to `category`
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_inspector::prelude::*;
    ///
    /// let logger = Logger::builder().console_output(false).build().unwrap();
    /// let db = logger.child("Database").with_field("pool", "primary");
    /// db.child("Query").warn("slow");
    ///
    /// let entry = &logger.logs()[0];
    /// assert_eq!(entry.category.as_deref(), Some("Database:Query"));
    /// ```
    pub fn child(&self, category: impl Into<String>) -> ChildLogger {
        ChildLogger::new(self.clone()).with_category(category)
    }

    /// Child logger bound to `fields`
    pub fn with_fields(&self, fields: LogFields) -> ChildLogger {
        ChildLogger::new(self.clone()).with_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiet() -> Logger {
        Logger::builder()
            .without_console_appender()
            .build()
            .unwrap()
    }

    #[test]
    fn test_bound_fields_under_call_site() {
        let logger = quiet();
        let child = logger.with_fields(LogFields::new().with_field("a", 1).with_field("b", 1));
        child.log_with(LogLevel::Info, "x", LogOptions::new().field("a", 2));

        let entry = &logger.logs()[0];
        assert_eq!(
            entry.fields,
            Some(LogFields::new().with_field("a", 2).with_field("b", 1))
        );
    }

    #[test]
    fn test_tags_concatenate_without_duplicates() {
        let logger = quiet();
        let child = logger.child("Api").with_tags(["http", "v2"]);
        child.log_with(LogLevel::Info, "x", LogOptions::new().tags(["v2", "slow"]));

        let entry = &logger.logs()[0];
        assert_eq!(
            entry.tags,
            Some(vec!["http".to_string(), "v2".to_string(), "slow".to_string()])
        );
    }

    #[test]
    fn test_context_and_category_call_site_wins() {
        let logger = quiet();
        let mut bound = serde_json::Map::new();
        bound.insert("region".into(), json!("eu"));
        bound.insert("shard".into(), json!(1));
        let child = logger.child("Bound").with_context(bound);

        child.log_with(
            LogLevel::Info,
            "x",
            LogOptions::new()
                .category("CallSite")
                .context_value("shard", json!(7)),
        );

        let entry = &logger.logs()[0];
        assert_eq!(entry.category.as_deref(), Some("CallSite"));
        let context = entry.context.as_ref().unwrap();
        assert_eq!(context["region"], json!("eu"));
        assert_eq!(context["shard"], json!(7));
    }

    #[test]
    fn test_functional_update_leaves_parent_untouched() {
        let logger = quiet();
        let parent = logger.child("Parent").with_field("k", "parent");
        let derived = parent.with_field("k", "derived").with_tags(["t"]);

        assert_eq!(parent.fields().get("k"), Some(&FieldValue::from("parent")));
        assert!(parent.tags().is_empty());
        assert_eq!(derived.fields().get("k"), Some(&FieldValue::from("derived")));
        assert_eq!(derived.category(), Some("Parent"));
    }

    #[test]
    fn test_nested_child_category() {
        let logger = quiet();
        let nested = logger.child("App").child("Auth").child("Token");
        assert_eq!(nested.category(), Some("App:Auth:Token"));
        assert_eq!(ChildLogger::new(logger).child("Root").category(), Some("Root"));
    }

    #[test]
    fn test_child_respects_category_policy() {
        let logger = Logger::builder()
            .without_console_appender()
            .category("Chatty", crate::core::CategoryConfig::with_level(LogLevel::Error))
            .build()
            .unwrap();

        let chatty = logger.child("Chatty");
        chatty.info("dropped");
        chatty.error("kept");
        assert_eq!(logger.logs().len(), 1);
    }
}
