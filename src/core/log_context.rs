//! Scalar fields attached to entries, plus the engine-wide field store
//! whose values are merged beneath per-call fields.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One field value
///
/// Fields are restricted to strings, numbers and booleans so that
/// they stay queryable; anything richer belongs in the entry's `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl FieldValue {
    /// Non-finite floats become `null`
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
        }
    }

    /// Convert a JSON scalar; arrays, objects and null are rejected
    pub fn from_json_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(FieldValue::String(s.clone())),
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float)),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

macro_rules! int_field_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FieldValue {
            fn from(n: $ty) -> Self {
                FieldValue::Int(i64::from(n))
            }
        })*
    };
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Structured key-value fields of one entry
///
/// Keys are kept sorted so exports and comparisons are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogFields {
    fields: BTreeMap<String, FieldValue>,
}

impl LogFields {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Insert or overwrite
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    /// Insert only when the key is not present yet
    pub fn add_if_absent<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Overlay `other` on top of these fields; `other` wins on conflicts
    pub fn extend_from(&mut self, other: &LogFields) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Iterate fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LogFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl<K, V> FromIterator<(K, V)> for LogFields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = LogFields::new();
        for (key, value) in iter {
            fields.add_field(key, value);
        }
        fields
    }
}

/// Logger-level persistent fields
///
/// Fields set here are merged into every entry (below per-call fields).
/// Cloning shares the underlying store.
///
/// # Example
///
/// ```
/// use rust_log_inspector::core::GlobalFields;
///
/// let ctx = GlobalFields::new();
/// ctx.set("service", "checkout");
/// ctx.set("version", "1.2.3");
///
/// assert_eq!(ctx.snapshot().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlobalFields {
    fields: Arc<RwLock<LogFields>>,
}

impl GlobalFields {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            fields: Arc::new(RwLock::new(LogFields::new())),
        }
    }

    /// Set a field; overwrites an existing value
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.write().add_field(key, value);
    }

    /// Merge a whole field set into the store
    pub fn extend(&self, fields: &LogFields) {
        self.fields.write().extend_from(fields);
    }

    /// Remove a field
    pub fn remove(&self, key: &str) {
        self.fields.write().remove(key);
    }

    /// Clear all fields
    pub fn clear(&self) {
        *self.fields.write() = LogFields::new();
    }

    /// Get a copy of all fields
    pub fn snapshot(&self) -> LogFields {
        self.fields.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }

    /// Set a field until the returned guard drops; a value it shadowed is
    /// put back then, otherwise the key is removed
    pub fn scoped<K, V>(&self, key: K, value: V) -> ContextGuard
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let previous = {
            let mut fields = self.fields.write();
            let previous = fields.remove(&key);
            fields.add_field(key.clone(), value);
            previous
        };
        ContextGuard::new(Arc::clone(&self.fields), key, previous)
    }
}

/// RAII guard for a scoped global field
///
/// When dropped, puts back the value the scope shadowed, or removes the field.
///
/// # Example
///
/// ```
/// use rust_log_inspector::core::GlobalFields;
///
/// let ctx = GlobalFields::new();
/// {
///     let _guard = ctx.scoped("request_id", "abc-123");
///     assert!(ctx.snapshot().contains_key("request_id"));
/// }
/// assert!(ctx.is_empty());
/// ```
pub struct ContextGuard {
    fields: Arc<RwLock<LogFields>>,
    key: String,
    previous: Option<FieldValue>,
}

impl ContextGuard {
    pub(crate) fn new(fields: Arc<RwLock<LogFields>>, key: String, previous: Option<FieldValue>) -> Self {
        Self {
            fields,
            key,
            previous,
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let mut fields = self.fields.write();
        match self.previous.take() {
            Some(value) => fields.add_field(self.key.clone(), value),
            None => {
                fields.remove(&self.key);
            }
        }
    }
}
