//! Turning an intercepted sink call into a log entry

use super::host_console::ConsoleMethod;
use crate::core::{HostValue, LogEntry, LogPayload};

/// Category given to every intercepted entry
pub const INTERCEPT_CATEGORY: &str = "Console";
/// Tag given to every intercepted entry
pub const INTERCEPT_TAG: &str = "console-intercept";

/// Build the entry for one call to `method`
///
/// Primitive arguments form the message, joined by a space. Everything else
/// becomes the entry's data; an error argument takes precedence and turns
/// the data into a fault carrying its stack.
pub fn entry_from_call(method: ConsoleMethod, args: &[HostValue]) -> LogEntry {
    let message = args
        .iter()
        .filter(|arg| arg.is_primitive())
        .map(HostValue::display_string)
        .collect::<Vec<_>>()
        .join(" ");

    let entry = LogEntry::new(method.level(), message)
        .with_category(INTERCEPT_CATEGORY)
        .with_tags(vec![INTERCEPT_TAG.to_string()]);

    if let Some(error) = args.iter().find(|arg| arg.is_error()) {
        return entry.with_data(LogPayload::sanitize(error));
    }

    let rest: Vec<HostValue> = args
        .iter()
        .filter(|arg| !arg.is_primitive())
        .cloned()
        .collect();

    match LogPayload::sanitize_all(&rest) {
        Some(data) => entry.with_data(data),
        None => entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use serde_json::json;

    #[test]
    fn test_primitive_args_form_message() {
        let entry = entry_from_call(
            ConsoleMethod::Log,
            &["user".into(), HostValue::Number(42.0), true.into()],
        );
        assert_eq!(entry.message, "user 42 true");
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.category.as_deref(), Some(INTERCEPT_CATEGORY));
        assert!(entry.has_tag(INTERCEPT_TAG));
        assert!(entry.data.is_none());
    }

    #[test]
    fn test_object_arg_becomes_data() {
        let entry = entry_from_call(
            ConsoleMethod::Warn,
            &[
                "config".into(),
                HostValue::object([("retries", HostValue::Number(3.0))]),
            ],
        );
        assert_eq!(entry.message, "config");
        assert_eq!(entry.data, Some(LogPayload::Structured(json!({"retries": 3.0}))));
    }

    #[test]
    fn test_several_objects_become_array() {
        let entry = entry_from_call(
            ConsoleMethod::Debug,
            &[
                HostValue::Array(vec![HostValue::Number(1.0)]),
                HostValue::object([("a", HostValue::Bool(false))]),
            ],
        );
        assert_eq!(entry.message, "");
        assert_eq!(
            entry.data,
            Some(LogPayload::Structured(json!([[1.0], {"a": false}])))
        );
    }

    #[test]
    fn test_error_arg_sets_fault_and_stack() {
        let error = HostValue::Error {
            name: "TypeError".to_string(),
            message: "x is undefined".to_string(),
            stack: Some("at render (app.js:3:7)".to_string()),
        };
        let entry = entry_from_call(ConsoleMethod::Error, &["render failed".into(), error]);

        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.message, "render failed");
        assert!(entry.data.as_ref().is_some_and(LogPayload::is_fault));
        assert_eq!(entry.stack.as_deref(), Some("at render (app.js:3:7)"));
    }
}
