//! The raw attribute map backing every record.
//!
//! This module provides [`AttributeMap`], the read-only key/value store a
//! record is constructed from. It is a thin newtype over
//! [`serde_json::Map`] so any decoded JSON object can back a record without
//! conversion.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{value_kind, RecordError};

pub(crate) static NULL: Value = Value::Null;

/// Read-only mapping from string keys to raw values.
///
/// Lookups never fail: a missing key reads as [`Value::Null`], which is
/// indistinguishable from a key explicitly set to `null`. Records never
/// mutate their map after construction.
///
/// # Example
///
/// ```
/// use recordkit::AttributeMap;
/// use serde_json::json;
///
/// let attrs = AttributeMap::from_value(json!({"id": 7, "name": null}))?;
///
/// assert_eq!(attrs.get("id"), &json!(7));
/// assert!(attrs.get("missing").is_null());
/// assert!(!attrs.is_present("name"));
/// # Ok::<(), recordkit::RecordError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(Map<String, Value>);

impl AttributeMap {
    /// Create an empty attribute map.
    #[inline]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build an attribute map from a decoded JSON value.
    ///
    /// `null` yields an empty map, so an omitted payload is not an error.
    ///
    /// # Errors
    ///
    /// * [`RecordError::InvalidAttributes`] - The value is neither an object nor `null`
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(RecordError::InvalidAttributes {
                found: value_kind(&other),
            }),
        }
    }

    /// Look up a raw value, reading a missing key as `null`.
    #[inline]
    pub fn get(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }

    /// Whether the key exists, even if it maps to `null`.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether the key maps to a non-null value.
    #[inline]
    pub fn is_present(&self, key: &str) -> bool {
        !self.get(key).is_null()
    }

    /// Whether the key maps to a truthy value (see [`is_truthy`]).
    #[inline]
    pub fn is_truthy(&self, key: &str) -> bool {
        is_truthy(self.get(key))
    }

    /// Number of keys, including keys mapped to `null`.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Iterate over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Borrow the underlying JSON map.
    #[inline]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into the underlying JSON map.
    #[inline]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Derive the attribute map for a nested object that absorbs its siblings.
    ///
    /// Returns a shallow copy of this map with `from` removed and its value
    /// reinserted under `to`. Every other entry is kept as is:
    ///
    /// ```text
    /// {from: v, other: w}   ->   {other: w, to: v}
    /// ```
    ///
    /// The receiver is left untouched.
    pub fn promote(&self, from: &str, to: &str) -> AttributeMap {
        let mut copy = self.0.clone();
        let value = copy.remove(from).unwrap_or(Value::Null);
        copy.insert(to.to_owned(), value);
        Self(copy)
    }
}

/// Truthiness of a raw value.
///
/// Only `null` and `false` are falsy. Zero, empty strings and empty
/// collections are present values and therefore truthy.
#[inline]
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

impl From<Map<String, Value>> for AttributeMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Option<AttributeMap>> for AttributeMap {
    fn from(attrs: Option<AttributeMap>) -> Self {
        attrs.unwrap_or_default()
    }
}

impl From<AttributeMap> for Value {
    fn from(attrs: AttributeMap) -> Self {
        Value::Object(attrs.0)
    }
}

impl TryFrom<Value> for AttributeMap {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl FromIterator<(String, Value)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
