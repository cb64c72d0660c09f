//! Data payload sanitization
//!
//! Arbitrary values handed to the engine (either by callers or by the host's
//! logging sink) are modelled as [`HostValue`] and reduced to a [`LogPayload`]
//! before storage. A `LogPayload` is always serializable, so entries can be
//! exported or published without failing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Nesting depth beyond which values are replaced with a placeholder
pub const MAX_SANITIZE_DEPTH: usize = 32;

/// A value as it arrives from the host environment
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<HostValue>),
    /// Keyed collection whose keys are not necessarily strings
    Map(Vec<(HostValue, HostValue)>),
    /// Plain object, key order preserved
    Object(Vec<(String, HostValue)>),
    Function { name: Option<String> },
    Symbol { description: Option<String> },
    Promise,
    Error {
        name: String,
        message: String,
        stack: Option<String>,
    },
    /// Anything the host could not describe further
    Opaque { type_name: String },
}

impl HostValue {
    /// Build an error-shaped value
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        HostValue::Error {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Build an object from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, HostValue)>,
    {
        HostValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Strings, numbers, booleans, null and undefined
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            HostValue::Null
                | HostValue::Undefined
                | HostValue::Bool(_)
                | HostValue::Number(_)
                | HostValue::String(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HostValue::Error { .. })
    }

    /// Short human-readable rendering used when composing messages
    pub fn display_string(&self) -> String {
        match self {
            HostValue::Null => "null".to_string(),
            HostValue::Undefined => "undefined".to_string(),
            HostValue::Bool(b) => b.to_string(),
            HostValue::Number(n) => format_number(*n),
            HostValue::String(s) => s.clone(),
            HostValue::Error { name, message, .. } => format!("{}: {}", name, message),
            other => match sanitize_value(other, 0) {
                serde_json::Value::String(s) => s,
                value => value.to_string(),
            },
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Number(n as f64)
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        HostValue::Number(n as f64)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(b),
            serde_json::Value::Number(n) => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => HostValue::String(s),
            serde_json::Value::Array(items) => {
                HostValue::Array(items.into_iter().map(HostValue::from).collect())
            }
            serde_json::Value::Object(map) => HostValue::Object(
                map.into_iter().map(|(k, v)| (k, HostValue::from(v))).collect(),
            ),
        }
    }
}

/// Sanitized payload stored on an entry
///
/// Error shapes are a distinct variant so consumers can pattern-match on them
/// instead of probing the structure. On the wire a payload is the plain
/// sanitized value: a string, any JSON value, or `{name, message, stack}`.
#[derive(Debug, Clone, PartialEq)]
pub enum LogPayload {
    Text(String),
    Structured(serde_json::Value),
    Fault {
        name: String,
        message: String,
        trace: Option<String>,
    },
}

impl Serialize for LogPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LogPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(LogPayload::from_json_value(value))
    }
}

impl LogPayload {
    /// Reduce a host value to a storable payload. Never fails.
    pub fn sanitize(value: &HostValue) -> Self {
        match value {
            HostValue::String(s) => LogPayload::Text(s.clone()),
            HostValue::Error {
                name,
                message,
                stack,
            } => LogPayload::Fault {
                name: name.clone(),
                message: message.clone(),
                trace: stack.clone(),
            },
            other => match sanitize_value(other, 0) {
                serde_json::Value::String(s) => LogPayload::Text(s),
                json => LogPayload::Structured(json),
            },
        }
    }

    /// Classify a plain JSON value: an object holding exactly string `name`
    /// and `message` (plus an optional string `stack`) is a fault
    pub fn from_json_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => LogPayload::Text(s),
            serde_json::Value::Object(map) => match fault_fields(&map) {
                Some((name, message, trace)) => LogPayload::Fault {
                    name,
                    message,
                    trace,
                },
                None => LogPayload::Structured(serde_json::Value::Object(map)),
            },
            other => LogPayload::Structured(other),
        }
    }

    /// Sanitize several values: one value maps to itself, several to an array
    pub fn sanitize_all(values: &[HostValue]) -> Option<Self> {
        match values {
            [] => None,
            [single] => Some(Self::sanitize(single)),
            many => Some(LogPayload::Structured(serde_json::Value::Array(
                many.iter().map(|v| sanitize_value(v, 0)).collect(),
            ))),
        }
    }

    /// Capture any serializable value; degrades to a placeholder on failure
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(serde_json::Value::String(s)) => LogPayload::Text(s),
            Ok(json) => LogPayload::Structured(json),
            Err(_) => LogPayload::Text("[Unserializable]".to_string()),
        }
    }

    /// Capture a Rust error and its source chain as a fault
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        LogPayload::Fault {
            name: short_type_name(std::any::type_name::<E>()),
            message: err.to_string(),
            trace: if chain.is_empty() {
                None
            } else {
                Some(chain.join("\n"))
            },
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, LogPayload::Fault { .. })
    }

    /// Trace text of a fault payload
    pub fn trace(&self) -> Option<&str> {
        match self {
            LogPayload::Fault { trace, .. } => trace.as_deref(),
            _ => None,
        }
    }

    /// Plain JSON view; this is also the serialized form
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            LogPayload::Text(s) => serde_json::Value::String(s.clone()),
            LogPayload::Structured(value) => value.clone(),
            LogPayload::Fault {
                name,
                message,
                trace,
            } => fault_object(name, message, trace.as_deref()),
        }
    }
}

impl<'a> From<&'a (dyn std::error::Error + 'a)> for LogPayload {
    fn from(err: &'a (dyn std::error::Error + 'a)) -> Self {
        LogPayload::from_error(err)
    }
}

impl fmt::Display for LogPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogPayload::Text(s) => write!(f, "{}", s),
            LogPayload::Structured(value) => write!(f, "{}", value),
            LogPayload::Fault { name, message, .. } => write!(f, "{}: {}", name, message),
        }
    }
}

fn short_type_name(full: &str) -> String {
    let trimmed = full.trim_start_matches("dyn ");
    let base = trimmed.split('<').next().unwrap_or(trimmed);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

fn fault_fields(
    map: &serde_json::Map<String, serde_json::Value>,
) -> Option<(String, String, Option<String>)> {
    if map.keys().any(|k| !matches!(k.as_str(), "name" | "message" | "stack")) {
        return None;
    }
    let name = map.get("name")?.as_str()?.to_string();
    let message = map.get("message")?.as_str()?.to_string();
    let trace = match map.get("stack") {
        None => None,
        Some(stack) => Some(stack.as_str()?.to_string()),
    };
    Some((name, message, trace))
}

fn fault_object(name: &str, message: &str, stack: Option<&str>) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("name".to_string(), serde_json::Value::String(name.to_string()));
    obj.insert(
        "message".to_string(),
        serde_json::Value::String(message.to_string()),
    );
    if let Some(stack) = stack {
        obj.insert("stack".to_string(), serde_json::Value::String(stack.to_string()));
    }
    serde_json::Value::Object(obj)
}

fn sanitize_value(value: &HostValue, depth: usize) -> serde_json::Value {
    if depth >= MAX_SANITIZE_DEPTH {
        return serde_json::Value::String("[MaxDepth]".to_string());
    }

    match value {
        HostValue::Null | HostValue::Undefined => serde_json::Value::Null,
        HostValue::Bool(b) => serde_json::Value::Bool(*b),
        HostValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        HostValue::String(s) => serde_json::Value::String(s.clone()),
        HostValue::Array(items) => serde_json::Value::Array(
            items.iter().map(|v| sanitize_value(v, depth + 1)).collect(),
        ),
        HostValue::Map(entries) => {
            let mut obj = serde_json::Map::new();
            for (key, val) in entries {
                obj.insert(key.display_string(), sanitize_value(val, depth + 1));
            }
            serde_json::Value::Object(obj)
        }
        HostValue::Object(entries) => {
            let mut obj = serde_json::Map::new();
            for (key, val) in entries {
                obj.insert(key.clone(), sanitize_value(val, depth + 1));
            }
            serde_json::Value::Object(obj)
        }
        HostValue::Function { name } => serde_json::Value::String(format!(
            "[Function: {}]",
            name.as_deref().unwrap_or("anonymous")
        )),
        HostValue::Symbol { description } => serde_json::Value::String(format!(
            "[Symbol({})]",
            description.as_deref().unwrap_or("")
        )),
        HostValue::Promise => serde_json::Value::String("[Promise]".to_string()),
        HostValue::Error {
            name,
            message,
            stack,
        } => fault_object(name, message, stack.as_deref()),
        HostValue::Opaque { type_name } => {
            serde_json::Value::String(format!("[Object: {}]", type_name))
        }
    }
}
