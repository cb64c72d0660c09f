//! Error types for the capture engine
//!
//! Logging calls themselves never return these; they surface from
//! configuration, export/import, the scheduler and `timed_operation`.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Export requested in a format the engine does not produce
    #[error("Unknown export format: '{0}'")]
    UnknownExportFormat(String),

    /// Wrapped operation failed (see `Logger::timed_operation`)
    #[error("Operation '{operation}' failed: {message}")]
    OperationFailed { operation: String, message: String },

    /// Background scheduler could not be started or stopped
    #[error("Scheduler error: {0}")]
    SchedulerError(String),

    /// Output sink failed to write an entry
    #[error("Appender '{appender}' failed: {message}")]
    AppenderError { appender: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an operation failure error
    pub fn operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::OperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an appender error
    pub fn appender(appender: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::AppenderError {
            appender: appender.into(),
            message: message.into(),
        }
    }

    /// Create a scheduler error
    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        LoggerError::SchedulerError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LoggerConfig", "maxLogs must be greater than zero");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::operation("load-user", "not found");
        assert!(matches!(err, LoggerError::OperationFailed { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("LoggerConfig", "batchSize must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LoggerConfig: batchSize must be greater than zero"
        );

        let err = LoggerError::UnknownExportFormat("xml".to_string());
        assert_eq!(err.to_string(), "Unknown export format: 'xml'");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: LoggerError = parse_err.into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
