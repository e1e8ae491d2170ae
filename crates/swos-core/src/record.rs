//! Decoded field values and records

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::{Serialize, Serializer};

/// A single decoded field value
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer (hex `0x..` or plain decimal on the wire)
    Int(i64),
    /// Text (decoded ASCII, rendered address, or the raw token)
    Text(String),
}

impl FieldValue {
    /// Integer value, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Text value, if this is a `Text`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Int(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Fields decoded from one blob.
///
/// Built once by the decoder and never mutated afterwards. Field names whose
/// typed decoding fell back to the raw token are tracked separately so that
/// degraded values stay visible to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
    degraded: BTreeSet<String>,
}

impl Record {
    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Look up an integer field
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_int)
    }

    /// Look up a text field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the blob carried no usable field
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Names of fields kept as raw text because typed decoding failed
    pub fn degraded_fields(&self) -> impl Iterator<Item = &str> {
        self.degraded.iter().map(String::as_str)
    }

    pub fn is_degraded(&self, key: &str) -> bool {
        self.degraded.contains(key)
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        self.degraded.remove(&key);
        self.fields.insert(key, value);
    }

    pub(crate) fn insert_degraded(&mut self, key: impl Into<String>, raw: String) {
        let key = key.into();
        self.degraded.insert(key.clone());
        self.fields.insert(key, FieldValue::Text(raw));
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut record = Record::default();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.fields)
    }
}
