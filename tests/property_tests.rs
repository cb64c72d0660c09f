//! Property-based tests for level policy, buffering, field merging and sanitization

use proptest::prelude::*;
use rust_log_inspector::core::{CaptureBuffer, FieldSources, GlobalFields, StructuredConfig, TraceContext};
use rust_log_inspector::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

fn quiet_logger(level: LogLevel, max_logs: usize) -> Logger {
    Logger::builder()
        .without_console_appender()
        .level(level)
        .max_logs(max_logs)
        .batch_size(max_logs + 1)
        .build()
        .unwrap()
}

// ============================================================================
// Level policy
// ============================================================================

proptest! {
    #[test]
    fn test_threshold_accepts_at_or_above(threshold in any_level(), level in any_level()) {
        let logger = quiet_logger(threshold, 10);
        logger.log(level, "probe");

        let accepted = logger.logs().len() == 1;
        prop_assert_eq!(accepted, level >= threshold);
        prop_assert_eq!(logger.should_log(level, None), level >= threshold);
    }

    #[test]
    fn test_level_ordering_matches_discriminant(a in any_level(), b in any_level()) {
        prop_assert_eq!(a < b, (a as u8) < (b as u8));
    }

    #[test]
    fn test_level_str_roundtrip(level in any_level(), lower in any::<bool>()) {
        let text = if lower { level.as_lowercase() } else { level.to_str() };
        prop_assert_eq!(text.parse::<LogLevel>().unwrap(), level);
    }

    #[test]
    fn test_level_json_roundtrip(level in any_level()) {
        let json = serde_json::to_string(&level).unwrap();
        let back: LogLevel = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, level);
    }
}

// ============================================================================
// Capture buffer
// ============================================================================

proptest! {
    #[test]
    fn test_staging_is_bounded_fifo(max_logs in 1usize..20, count in 0usize..60) {
        let mut buffer = CaptureBuffer::new(max_logs);
        for i in 0..count {
            let len = buffer.append(Arc::new(LogEntry::new(LogLevel::Info, i.to_string())));
            prop_assert!(len <= max_logs);
        }

        let kept: Vec<String> = buffer.staged().map(|e| e.message.clone()).collect();
        let expected: Vec<String> = (count.saturating_sub(max_logs)..count)
            .map(|i| i.to_string())
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn test_engine_keeps_most_recent(max_logs in 1usize..10, count in 1usize..30) {
        let logger = quiet_logger(LogLevel::Trace, max_logs);
        for i in 0..count {
            logger.info(format!("m{}", i));
        }

        let logs = logger.logs();
        prop_assert_eq!(logs.len(), count.min(max_logs));
        prop_assert_eq!(&logs.last().unwrap().message, &format!("m{}", count - 1));
    }

    #[test]
    fn test_history_merge_is_idempotent(count in 1usize..30) {
        let mut buffer = CaptureBuffer::new(100);
        let entries: Vec<Arc<LogEntry>> = (0..count)
            .map(|i| Arc::new(LogEntry::new(LogLevel::Info, i.to_string())))
            .collect();

        buffer.merge_into_history(&entries);
        buffer.merge_into_history(&entries);
        prop_assert_eq!(buffer.history_len(), count);
    }
}

// ============================================================================
// Field merging
// ============================================================================

fn small_fields() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-d]", any::<i64>(), 0..4)
}

fn to_fields(map: &BTreeMap<String, i64>) -> LogFields {
    map.iter()
        .fold(LogFields::new(), |fields, (k, v)| fields.with_field(k.clone(), *v))
}

proptest! {
    #[test]
    fn test_call_site_fields_win(globals in small_fields(), per_call in small_fields()) {
        let structured = StructuredConfig::default();
        let store = GlobalFields::new();
        store.extend(&to_fields(&globals));
        let trace = TraceContext::new();

        let resolved = FieldSources { structured: &structured, globals: &store, trace: &trace }
            .resolve(Some(&to_fields(&per_call)));

        let mut expected = globals.clone();
        expected.extend(per_call.clone());

        match resolved {
            None => prop_assert!(expected.is_empty()),
            Some(fields) => {
                prop_assert_eq!(fields.len(), expected.len());
                for (key, value) in &expected {
                    prop_assert_eq!(fields.get(key), Some(&FieldValue::Int(*value)));
                }
            }
        }
    }
}

// ============================================================================
// Sanitization and logging never panic
// ============================================================================

fn host_value() -> impl Strategy<Value = HostValue> {
    let leaf = prop_oneof![
        Just(HostValue::Null),
        Just(HostValue::Undefined),
        any::<bool>().prop_map(HostValue::Bool),
        any::<f64>().prop_map(HostValue::Number),
        ".*".prop_map(HostValue::String),
        Just(HostValue::Promise),
        ".*".prop_map(|name| HostValue::Function { name: Some(name) }),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(HostValue::Array),
            prop::collection::vec(("[a-z]{1,4}", inner.clone()), 0..4).prop_map(HostValue::Object),
            prop::collection::vec((inner.clone(), inner), 0..3).prop_map(HostValue::Map),
        ]
    })
}

proptest! {
    #[test]
    fn test_sanitized_payload_always_serializes(value in host_value()) {
        let payload = LogPayload::sanitize(&value);
        prop_assert!(serde_json::to_string(&payload).is_ok());
    }

    #[test]
    fn test_any_message_and_payload_logs(message in ".*", value in host_value(), level in any_level()) {
        let logger = quiet_logger(LogLevel::Trace, 5);
        logger.log_with(level, message.clone(), LogOptions::new().host_data(&[value]));

        let logs = logger.logs();
        prop_assert_eq!(logs.len(), 1);
        prop_assert_eq!(&logs[0].message, &message);
        prop_assert!(logger.export(ExportFormat::Json).is_ok());
        prop_assert!(logger.export(ExportFormat::Csv).is_ok());
    }

    #[test]
    fn test_csv_rows_quote_separators(message in "[a-z ,\"]{0,20}") {
        let logger = quiet_logger(LogLevel::Trace, 5);
        logger.info(message.clone());

        let csv = logger.export(ExportFormat::Csv).unwrap();
        let row = csv.lines().nth(1).unwrap();
        if message.contains(',') || message.contains('"') {
            let quoted = format!("\"{}\"", message.replace('"', "\"\""));
            prop_assert!(row.contains(&quoted));
        }
    }
}
