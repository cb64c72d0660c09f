//! Structured field resolution
//!
//! Fields are merged from five tiers, later tiers overwrite earlier ones:
//!
//! 1. `structured.globalFields` from the configuration
//! 2. fields set at runtime through [`GlobalFields`]
//! 3. `correlationId` / `traceId` when auto-tracing is on and the key is free
//! 4. `hostname` (and `timestamp`) when enabled and the key is free
//! 5. per-call fields, which always win
//!
//! With the structured subsystem disabled only tier 5 applies.

use super::config::StructuredConfig;
use super::log_context::{GlobalFields, LogFields};
use super::trace_context::{generate_trace_id, TraceContext};
use std::sync::OnceLock;

pub const CORRELATION_ID_FIELD: &str = "correlationId";
pub const TRACE_ID_FIELD: &str = "traceId";
pub const HOSTNAME_FIELD: &str = "hostname";
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Local host name, resolved once per process
pub fn local_hostname() -> &'static str {
    static HOSTNAME: OnceLock<String> = OnceLock::new();
    HOSTNAME.get_or_init(|| {
        hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

/// Inputs the resolver reads besides the per-call fields
pub struct FieldSources<'a> {
    pub structured: &'a StructuredConfig,
    pub globals: &'a GlobalFields,
    pub trace: &'a TraceContext,
}

impl FieldSources<'_> {
    /// Merge all tiers; `None` when nothing ends up in the map
    pub fn resolve(&self, per_call: Option<&LogFields>) -> Option<LogFields> {
        if !self.structured.enabled {
            return per_call.filter(|fields| !fields.is_empty()).cloned();
        }

        let mut merged = self.structured.global_fields.clone().unwrap_or_default();
        merged.extend_from(&self.globals.snapshot());

        if self.structured.auto_tracing {
            if !merged.contains_key(CORRELATION_ID_FIELD) {
                if let Some(correlation_id) = self.trace.correlation_id() {
                    merged.add_field(CORRELATION_ID_FIELD, correlation_id);
                }
            }
            if !merged.contains_key(TRACE_ID_FIELD) {
                let trace_id = self.trace.trace_id().unwrap_or_else(generate_trace_id);
                merged.add_field(TRACE_ID_FIELD, trace_id);
            }
        }

        if self.structured.include_hostname {
            merged.add_if_absent(HOSTNAME_FIELD, local_hostname());
        }

        if self.structured.include_timestamp {
            merged.add_if_absent(
                TIMESTAMP_FIELD,
                chrono::Utc::now()
                    .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                    .to_string(),
            );
        }

        if let Some(fields) = per_call {
            merged.extend_from(fields);
        }

        if merged.is_empty() {
            None
        } else {
            Some(merged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_context::FieldValue;

    struct Fixture {
        structured: StructuredConfig,
        globals: GlobalFields,
        trace: TraceContext,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                structured: StructuredConfig::default(),
                globals: GlobalFields::new(),
                trace: TraceContext::new(),
            }
        }

        fn resolve(&self, per_call: Option<&LogFields>) -> Option<LogFields> {
            FieldSources {
                structured: &self.structured,
                globals: &self.globals,
                trace: &self.trace,
            }
            .resolve(per_call)
        }
    }

    #[test]
    fn test_per_call_overrides_config_globals() {
        let mut fx = Fixture::new();
        fx.structured.global_fields = Some(LogFields::new().with_field("a", 1));

        let per_call = LogFields::new().with_field("a", 2).with_field("b", 3);
        let resolved = fx.resolve(Some(&per_call)).unwrap();

        assert_eq!(resolved, LogFields::new().with_field("a", 2).with_field("b", 3));
    }

    #[test]
    fn test_runtime_globals_merge_with_per_call() {
        let fx = Fixture::new();
        fx.globals.set("service", "x");

        let per_call = LogFields::new().with_field("userId", "u1");
        let resolved = fx.resolve(Some(&per_call)).unwrap();

        assert_eq!(
            resolved,
            LogFields::new().with_field("service", "x").with_field("userId", "u1")
        );
    }

    #[test]
    fn test_runtime_globals_override_config_globals() {
        let mut fx = Fixture::new();
        fx.structured.global_fields = Some(LogFields::new().with_field("env", "config"));
        fx.globals.set("env", "runtime");

        let resolved = fx.resolve(None).unwrap();
        assert_eq!(resolved.get("env"), Some(&FieldValue::from("runtime")));
    }

    #[test]
    fn test_disabled_structured_only_keeps_per_call() {
        let mut fx = Fixture::new();
        fx.structured.enabled = false;
        fx.structured.include_hostname = true;
        fx.globals.set("service", "x");

        assert_eq!(fx.resolve(None), None);

        let per_call = LogFields::new().with_field("k", true);
        assert_eq!(fx.resolve(Some(&per_call)), Some(per_call.clone()));
    }

    #[test]
    fn test_auto_tracing_uses_active_ids() {
        let mut fx = Fixture::new();
        fx.structured.auto_tracing = true;
        fx.trace.start_correlation(Some("corr-1".to_string()));
        fx.trace.start_trace(Some("trace-1".to_string()));

        let resolved = fx.resolve(None).unwrap();
        assert_eq!(resolved.get(CORRELATION_ID_FIELD), Some(&FieldValue::from("corr-1")));
        assert_eq!(resolved.get(TRACE_ID_FIELD), Some(&FieldValue::from("trace-1")));
    }

    #[test]
    fn test_auto_tracing_generates_trace_id_and_respects_existing() {
        let mut fx = Fixture::new();
        fx.structured.auto_tracing = true;

        let resolved = fx.resolve(None).unwrap();
        assert!(resolved.get(CORRELATION_ID_FIELD).is_none());
        match resolved.get(TRACE_ID_FIELD) {
            Some(FieldValue::String(id)) => assert_eq!(id.len(), 32),
            other => panic!("unexpected trace id {:?}", other),
        }

        fx.globals.set(TRACE_ID_FIELD, "pinned");
        let resolved = fx.resolve(None).unwrap();
        assert_eq!(resolved.get(TRACE_ID_FIELD), Some(&FieldValue::from("pinned")));
    }

    #[test]
    fn test_hostname_does_not_override_globals_but_per_call_does() {
        let mut fx = Fixture::new();
        fx.structured.include_hostname = true;

        let resolved = fx.resolve(None).unwrap();
        assert_eq!(
            resolved.get(HOSTNAME_FIELD),
            Some(&FieldValue::from(local_hostname()))
        );

        fx.globals.set(HOSTNAME_FIELD, "pinned-host");
        let resolved = fx.resolve(None).unwrap();
        assert_eq!(resolved.get(HOSTNAME_FIELD), Some(&FieldValue::from("pinned-host")));

        let per_call = LogFields::new().with_field(HOSTNAME_FIELD, "call-host");
        let resolved = fx.resolve(Some(&per_call)).unwrap();
        assert_eq!(resolved.get(HOSTNAME_FIELD), Some(&FieldValue::from("call-host")));
    }

    #[test]
    fn test_timestamp_field() {
        let mut fx = Fixture::new();
        fx.structured.include_timestamp = true;
        let resolved = fx.resolve(None).unwrap();
        assert!(matches!(resolved.get(TIMESTAMP_FIELD), Some(FieldValue::String(ts)) if ts.ends_with('Z')));
    }
}
