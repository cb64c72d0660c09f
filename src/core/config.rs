//! Runtime configuration of the capture engine
//!
//! `LoggerConfig` is created with defaults when the engine starts and is only
//! changed through [`ConfigUpdate`], the partial-update contract consumers
//! (for example an inspector panel) send over the `config-update` channel.

use super::error::{LoggerError, Result};
use super::log_context::LogFields;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default staging buffer capacity
pub const DEFAULT_MAX_LOGS: usize = 1000;
/// Default auto-flush trigger
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// Default flush timer period in milliseconds
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;

/// Per-category override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
}

impl CategoryConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            level: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            level: None,
        }
    }

    pub fn with_level(level: LogLevel) -> Self {
        Self {
            enabled: true,
            level: Some(level),
        }
    }
}

/// Output sink toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Write accepted entries to the console appender
    pub console: bool,
    /// Stage accepted entries for the devtools transport
    pub devtools: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            console: true,
            devtools: true,
        }
    }
}

/// Host sink interception settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptConfig {
    pub enabled: bool,
    /// Turn intercepted host calls into entries
    pub capture_sink: bool,
    /// Forward intercepted calls to the original sink function
    pub preserve_original: bool,
    /// Attach a best-effort source location from a captured backtrace
    pub include_trace: bool,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capture_sink: true,
            preserve_original: true,
            include_trace: false,
        }
    }
}

/// Structured field settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_fields: Option<LogFields>,
    #[serde(default)]
    pub auto_tracing: bool,
    #[serde(default)]
    pub include_hostname: bool,
    #[serde(default)]
    pub include_timestamp: bool,
}

impl Default for StructuredConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global_fields: None,
            auto_tracing: false,
            include_hostname: false,
            include_timestamp: false,
        }
    }
}

/// Process-wide engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    pub enabled: bool,
    pub level: LogLevel,
    #[serde(default)]
    pub categories: HashMap<String, CategoryConfig>,
    #[serde(default)]
    pub outputs: OutputConfig,
    pub max_logs: usize,
    pub batch_size: usize,
    #[serde(rename = "flushInterval")]
    pub flush_interval_ms: u64,
    #[serde(default)]
    pub intercept: InterceptConfig,
    #[serde(default)]
    pub structured: StructuredConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::Debug,
            categories: HashMap::new(),
            outputs: OutputConfig::default(),
            max_logs: DEFAULT_MAX_LOGS,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            intercept: InterceptConfig::default(),
            structured: StructuredConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.max_logs == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "maxLogs must be greater than zero",
            ));
        }
        if self.batch_size == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "batchSize must be greater than zero",
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "flushInterval must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Apply a partial update, returning the merged configuration
    ///
    /// The receiver is left untouched when the merged result fails validation.
    pub fn merged(&self, update: &ConfigUpdate) -> Result<Self> {
        let mut next = self.clone();

        if let Some(enabled) = update.enabled {
            next.enabled = enabled;
        }
        if let Some(level) = update.level {
            next.level = level;
        }
        if let Some(ref categories) = update.categories {
            for (name, category) in categories {
                next.categories.insert(name.clone(), category.clone());
            }
        }
        if let Some(ref outputs) = update.outputs {
            if let Some(console) = outputs.console {
                next.outputs.console = console;
            }
            if let Some(devtools) = outputs.devtools {
                next.outputs.devtools = devtools;
            }
        }
        if let Some(max_logs) = update.max_logs {
            next.max_logs = max_logs;
        }
        if let Some(batch_size) = update.batch_size {
            next.batch_size = batch_size;
        }
        if let Some(flush_interval) = update.flush_interval_ms {
            next.flush_interval_ms = flush_interval;
        }
        if let Some(ref intercept) = update.intercept {
            if let Some(enabled) = intercept.enabled {
                next.intercept.enabled = enabled;
            }
            if let Some(capture) = intercept.capture_sink {
                next.intercept.capture_sink = capture;
            }
            if let Some(preserve) = intercept.preserve_original {
                next.intercept.preserve_original = preserve;
            }
            if let Some(include_trace) = intercept.include_trace {
                next.intercept.include_trace = include_trace;
            }
        }
        if let Some(ref structured) = update.structured {
            if let Some(enabled) = structured.enabled {
                next.structured.enabled = enabled;
            }
            if let Some(ref fields) = structured.global_fields {
                next.structured.global_fields = Some(fields.clone());
            }
            if let Some(auto_tracing) = structured.auto_tracing {
                next.structured.auto_tracing = auto_tracing;
            }
            if let Some(include_hostname) = structured.include_hostname {
                next.structured.include_hostname = include_hostname;
            }
            if let Some(include_timestamp) = structured.include_timestamp {
                next.structured.include_timestamp = include_timestamp;
            }
        }

        next.validate()?;
        Ok(next)
    }
}

/// Partial output toggles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtools: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_sink: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_original: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_trace: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_fields: Option<LogFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_tracing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_hostname: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_timestamp: Option<bool>,
}

/// Partial `LoggerConfig`; absent fields keep their current value
///
/// Category overrides are merged per category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<HashMap<String, CategoryConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OutputUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_logs: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(
        default,
        rename = "flushInterval",
        skip_serializing_if = "Option::is_none"
    )]
    pub flush_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercept: Option<InterceptUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<StructuredUpdate>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn max_logs(mut self, max_logs: usize) -> Self {
        self.max_logs = Some(max_logs);
        self
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    #[must_use]
    pub fn flush_interval_ms(mut self, interval: u64) -> Self {
        self.flush_interval_ms = Some(interval);
        self
    }

    #[must_use]
    pub fn category(mut self, name: impl Into<String>, config: CategoryConfig) -> Self {
        self.categories
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), config);
        self
    }

    #[must_use]
    pub fn console_output(mut self, enabled: bool) -> Self {
        self.outputs.get_or_insert_with(OutputUpdate::default).console = Some(enabled);
        self
    }

    #[must_use]
    pub fn devtools_output(mut self, enabled: bool) -> Self {
        self.outputs.get_or_insert_with(OutputUpdate::default).devtools = Some(enabled);
        self
    }

    #[must_use]
    pub fn intercept_enabled(mut self, enabled: bool) -> Self {
        self.intercept.get_or_insert_with(InterceptUpdate::default).enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn structured(mut self, update: StructuredUpdate) -> Self {
        self.structured = Some(update);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.max_logs, DEFAULT_MAX_LOGS);
        assert!(!config.intercept.enabled);
        assert!(config.intercept.preserve_original);
        assert!(config.structured.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let config = LoggerConfig::default();
        let update = ConfigUpdate::new()
            .level(LogLevel::Warn)
            .devtools_output(false)
            .category("Network", CategoryConfig::with_level(LogLevel::Error));

        let merged = config.merged(&update).unwrap();
        assert_eq!(merged.level, LogLevel::Warn);
        assert!(!merged.outputs.devtools);
        assert!(merged.outputs.console);
        assert_eq!(merged.max_logs, DEFAULT_MAX_LOGS);
        assert_eq!(
            merged.categories.get("Network"),
            Some(&CategoryConfig::with_level(LogLevel::Error))
        );
    }

    #[test]
    fn test_invalid_update_rejected() {
        let config = LoggerConfig::default();
        let err = config.merged(&ConfigUpdate::new().max_logs(0)).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_json_wire_names() {
        let json = r#"{
            "enabled": true,
            "level": "info",
            "maxLogs": 200,
            "batchSize": 10,
            "flushInterval": 250,
            "categories": {"Auth": {"enabled": false}},
            "structured": {"enabled": true, "globalFields": {"service": "web"}, "autoTracing": true}
        }"#;

        let config = LoggerConfig::from_json(json).unwrap();
        assert_eq!(config.max_logs, 200);
        assert_eq!(config.flush_interval_ms, 250);
        assert!(!config.categories["Auth"].enabled);
        assert!(config.structured.auto_tracing);
        assert!(config.outputs.devtools);
    }

    #[test]
    fn test_update_deserializes_partially() {
        let update: ConfigUpdate =
            serde_json::from_str(r#"{"level": "error", "intercept": {"enabled": true}}"#).unwrap();
        assert_eq!(update.level, Some(LogLevel::Error));
        assert_eq!(
            update.intercept.as_ref().and_then(|i| i.enabled),
            Some(true)
        );
        assert!(update.max_logs.is_none());
    }
}
