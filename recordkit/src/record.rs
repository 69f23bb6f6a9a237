//! The instantiable record base.
//!
//! This module provides [`RecordBase`], which every record type embeds. It
//! owns the raw [`AttributeMap`], the per-instance [`MemoCache`], and a
//! reference to the type's [`Schema`], and implements every reader the
//! declaration forms produce.
//!
//! # Reader Semantics
//!
//! | Kind | Reader | Predicate |
//! |------|--------|-----------|
//! | Plain | raw value, `null` if absent | raw value is truthy |
//! | Object | wrapped record, null object if absent | raw value is present |
//! | Uri | parsed [`Url`], `None` if absent | raw value is truthy |
//! | DisplayUri | raw value, `null` if absent | raw value is truthy |
//!
//! Each reader and predicate is computed at most once per instance. Failed
//! evaluations (a malformed URI, a scalar where a nested map belongs) are not
//! cached.

use std::any::Any;
use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use url::Url;

use crate::attributes::{is_truthy, AttributeMap, NULL};
use crate::errors::{value_kind, RecordError};
use crate::memo::{MemoCache, MemoSlot};
use crate::schema::{AttributeDescriptor, AttributeKind, Role, Schema};
use crate::traits::{construct_boxed, Record, RecordType};
use crate::wrappers::{Attr, ObjectRef};

/// A memoized accessor result.
enum Memo {
    /// A plain read happened; the value itself is borrowed from the map.
    Read,
    Flag(bool),
    Uri(Option<Url>),
    Object(Nested),
}

struct Nested {
    record: Box<dyn Record>,
    present: bool,
}

/// Attribute map, memo cache and schema of one record instance.
///
/// A bare `RecordBase` is itself a record with no declared fields; record
/// types declared with `#[record]` wrap one and forward their generated
/// accessors to the typed readers below.
///
/// # Example
///
/// ```
/// use recordkit::{AttributeMap, RecordBase, Schema};
/// use serde_json::json;
///
/// static SCHEMA: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();
/// let schema = SCHEMA.get_or_init(|| {
///     Schema::builder("Entity")
///         .attr_reader(&["id"])
///         .uri_attr_reader(&["expanded_uri"])
///         .build()
/// });
///
/// let attrs = AttributeMap::from_value(json!({
///     "id": 1,
///     "expanded_url": "https://example.com/",
/// }))?;
/// let record = RecordBase::with_schema(schema, attrs);
///
/// assert_eq!(record.value("id"), &json!(1));
/// assert!(record.flag("expanded_uri"));
/// assert_eq!(record.uri("expanded_url")?.map(|u| u.as_str()), Some("https://example.com/"));
/// assert!(record.indexed_get("nope")?.is_none());
/// # Ok::<(), recordkit::RecordError>(())
/// ```
pub struct RecordBase {
    schema: &'static Schema,
    attrs: AttributeMap,
    cache: MemoCache<Memo>,
}

impl RecordBase {
    /// Create a record with no declared fields.
    ///
    /// `None` gives an empty attribute map.
    pub fn new(attrs: impl Into<AttributeMap>) -> Self {
        Self::with_schema(Schema::empty(), attrs.into())
    }

    /// Create a record governed by `schema`.
    pub fn with_schema(schema: &'static Schema, attrs: AttributeMap) -> Self {
        Self {
            schema,
            attrs,
            cache: MemoCache::new(schema.slot_count()),
        }
    }

    /// The record type's schema.
    #[inline]
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// The backing attribute map, exactly as constructed.
    #[inline]
    pub fn raw_attributes(&self) -> &AttributeMap {
        &self.attrs
    }

    /// Alias of [`raw_attributes`](Self::raw_attributes).
    #[inline]
    pub fn to_h(&self) -> &AttributeMap {
        &self.attrs
    }

    /// Give up the record and keep its attribute map.
    #[inline]
    pub fn into_raw_attributes(self) -> AttributeMap {
        self.attrs
    }

    /// Read an accessor by name.
    ///
    /// `name` may be any declared reader (`text`), predicate (`text?`) or
    /// alias (`expanded_url`). An undeclared name yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Only errors raised by a declared accessor, such as
    /// [`RecordError::MalformedUri`]. They are never turned into `None`.
    pub fn indexed_get(&self, name: &str) -> Result<Option<Attr<'_>>, RecordError> {
        let Some((descriptor, role)) = self.schema.resolve(name) else {
            return Ok(None);
        };
        self.evaluate(descriptor, role).map(Some)
    }

    /// Reader of a plain or display-URI field.
    ///
    /// An undeclared name reads as `null`. Names declared with another kind
    /// read their raw value without memoization.
    pub fn value(&self, name: &str) -> &Value {
        match self.schema.resolve(name) {
            Some((descriptor, _)) => self.plain(descriptor),
            None => &NULL,
        }
    }

    /// Predicate of a field, by reader name, alias or `?` name.
    ///
    /// An undeclared name is `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.schema
            .resolve(name)
            .is_some_and(|(descriptor, _)| self.predicate(descriptor))
    }

    /// Reader of a URI field, by either spelling.
    ///
    /// # Errors
    ///
    /// * [`RecordError::MalformedUri`] - The raw string is not a valid URI
    /// * [`RecordError::UriNotAString`] - The raw value is not a string
    /// * [`RecordError::UnknownAccessor`] - `name` is not declared
    /// * [`RecordError::KindMismatch`] - `name` is not a URI field
    pub fn uri(&self, name: &str) -> Result<Option<&Url>, RecordError> {
        let descriptor = self.declared(name, AttributeKind::Uri)?;
        self.parsed_uri(descriptor)
    }

    /// Reader of an object field, typed as the wrapped record `T`.
    ///
    /// # Errors
    ///
    /// * [`RecordError::NotAnObject`] - The raw value is present but not a map
    /// * [`RecordError::WrapperMismatch`] - The field does not wrap a `T`
    /// * [`RecordError::UnknownAccessor`] - `name` is not declared
    /// * [`RecordError::KindMismatch`] - `name` is not an object field
    pub fn object<T: RecordType>(&self, name: &str) -> Result<ObjectRef<'_, T>, RecordError> {
        let descriptor = self.declared(name, AttributeKind::Object)?;
        let nested = self.nested(descriptor)?;
        let record = nested.record.as_any().downcast_ref::<T>().ok_or_else(|| {
            RecordError::WrapperMismatch {
                field: descriptor.name().to_owned(),
                declared: nested.record.type_name().to_owned(),
                requested: T::schema().type_name(),
            }
        })?;
        Ok(ObjectRef::new(record, nested.present))
    }

    fn declared(&self, name: &str, kind: AttributeKind) -> Result<&'static AttributeDescriptor, RecordError> {
        let (descriptor, _) = self.schema.resolve(name).ok_or_else(|| RecordError::UnknownAccessor {
            record: self.schema.type_name(),
            name: name.to_owned(),
        })?;
        if descriptor.kind() != kind {
            return Err(RecordError::KindMismatch {
                record: self.schema.type_name(),
                name: name.to_owned(),
                declared: descriptor.kind().as_str(),
            });
        }
        Ok(descriptor)
    }

    fn evaluate(&self, descriptor: &AttributeDescriptor, role: Role) -> Result<Attr<'_>, RecordError> {
        match (role, descriptor.kind()) {
            (Role::Predicate, _) => Ok(Attr::Flag(self.predicate(descriptor))),
            (Role::Reader, AttributeKind::Plain | AttributeKind::DisplayUri) => Ok(Attr::Value(self.plain(descriptor))),
            (Role::Reader, AttributeKind::Uri) => self.parsed_uri(descriptor).map(Attr::Uri),
            (Role::Reader, AttributeKind::Object) => {
                let nested = self.nested(descriptor)?;
                Ok(Attr::Object(ObjectRef::new(nested.record.as_ref(), nested.present)))
            }
        }
    }

    fn slot(&self, descriptor: &AttributeDescriptor, role: Role) -> Option<&MemoSlot<Memo>> {
        self.cache.slot(descriptor.slot(role))
    }

    fn plain(&self, descriptor: &AttributeDescriptor) -> &Value {
        let raw = descriptor.raw_value(&self.attrs);
        if matches!(descriptor.kind(), AttributeKind::Plain | AttributeKind::DisplayUri) {
            if let Some(slot) = self.slot(descriptor, Role::Reader) {
                // The map never changes, so `raw` is already the stable value.
                let _ = slot.compute_or_fetch(|| Ok::<_, Infallible>(Memo::Read));
            }
        }
        raw
    }

    fn predicate(&self, descriptor: &AttributeDescriptor) -> bool {
        let compute = || {
            let raw = descriptor.raw_value(&self.attrs);
            match descriptor.kind() {
                AttributeKind::Object => !raw.is_null(),
                _ => is_truthy(raw),
            }
        };
        let memo = self
            .slot(descriptor, Role::Predicate)
            .map(|slot| slot.compute_or_fetch(|| Ok::<_, Infallible>(Memo::Flag(compute()))));
        match memo {
            Some(Ok(Memo::Flag(flag))) => *flag,
            _ => compute(),
        }
    }

    fn parsed_uri(&self, descriptor: &AttributeDescriptor) -> Result<Option<&Url>, RecordError> {
        let memo = self.memoized(descriptor, || {
            let parsed = match descriptor.raw_value(&self.attrs) {
                Value::Null => None,
                Value::String(raw) => Some(Url::parse(raw).map_err(|source| RecordError::MalformedUri {
                    field: descriptor.name().to_owned(),
                    raw: raw.clone(),
                    source,
                })?),
                other => {
                    return Err(RecordError::UriNotAString {
                        field: descriptor.name().to_owned(),
                        found: value_kind(other),
                    })
                }
            };
            Ok(Memo::Uri(parsed))
        })?;
        match memo {
            Memo::Uri(uri) => Ok(uri.as_ref()),
            _ => Err(self.kind_mismatch(descriptor)),
        }
    }

    fn nested(&self, descriptor: &AttributeDescriptor) -> Result<&Nested, RecordError> {
        let wrapper = descriptor.wrapper().ok_or_else(|| self.kind_mismatch(descriptor))?;
        let memo = self.memoized(descriptor, || {
            let raw = self.attrs.get(descriptor.key());
            if raw.is_null() {
                // Absence is never an error, even when the wrapper cannot be resolved.
                let record = wrapper
                    .construct(AttributeMap::new())
                    .unwrap_or_else(|_| construct_boxed::<RecordBase>(AttributeMap::new()));
                return Ok(Memo::Object(Nested { record, present: false }));
            }
            let attrs = match (descriptor.rename(), raw) {
                (Some(rename), _) => self.attrs.promote(descriptor.key(), rename),
                (None, Value::Object(map)) => AttributeMap::from(map.clone()),
                (None, other) => {
                    return Err(RecordError::NotAnObject {
                        field: descriptor.name().to_owned(),
                        found: value_kind(other),
                    })
                }
            };
            Ok(Memo::Object(Nested {
                record: wrapper.construct(attrs)?,
                present: true,
            }))
        })?;
        match memo {
            Memo::Object(nested) => Ok(nested),
            _ => Err(self.kind_mismatch(descriptor)),
        }
    }

    fn memoized(
        &self,
        descriptor: &AttributeDescriptor,
        thunk: impl FnOnce() -> Result<Memo, RecordError>,
    ) -> Result<&Memo, RecordError> {
        let slot = self.slot(descriptor, Role::Reader).ok_or_else(|| RecordError::UnknownAccessor {
            record: self.schema.type_name(),
            name: descriptor.name().to_owned(),
        })?;
        slot.compute_or_fetch(thunk)
    }

    fn kind_mismatch(&self, descriptor: &AttributeDescriptor) -> RecordError {
        RecordError::KindMismatch {
            record: self.schema.type_name(),
            name: descriptor.name().to_owned(),
            declared: descriptor.kind().as_str(),
        }
    }
}

impl Record for RecordBase {
    #[inline]
    fn base(&self) -> &RecordBase {
        self
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RecordType for RecordBase {
    fn schema() -> &'static Schema {
        Schema::empty()
    }

    fn from_base(base: RecordBase) -> Self {
        base
    }
}

impl fmt::Debug for RecordBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.schema.type_name())
            .field("attrs", &self.attrs)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Default for RecordBase {
    fn default() -> Self {
        Self::new(AttributeMap::new())
    }
}

impl From<AttributeMap> for RecordBase {
    fn from(attrs: AttributeMap) -> Self {
        Self::new(attrs)
    }
}

impl Serialize for RecordBase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attrs.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordBase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        AttributeMap::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::OnceLock;

    #[derive(Debug)]
    struct User {
        base: RecordBase,
    }

    impl Record for User {
        fn base(&self) -> &RecordBase {
            &self.base
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl RecordType for User {
        fn schema() -> &'static Schema {
            static SCHEMA: OnceLock<Schema> = OnceLock::new();
            SCHEMA.get_or_init(|| Schema::builder("User").attr_reader(&["id", "screen_name"]).build())
        }

        fn from_base(base: RecordBase) -> Self {
            Self { base }
        }
    }

    fn tweet_schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder("Tweet")
                .attr_reader(&["id", "text", "favorited", "retweet_count"])
                .object_attr_reader::<User>("user", None)
                .object_attr_reader::<RecordBase>("place", Some("venue"))
                .uri_attr_reader(&["expanded_uri"])
                .display_uri_attr_reader()
                .build()
        })
    }

    fn tweet(value: Value) -> RecordBase {
        RecordBase::with_schema(tweet_schema(), AttributeMap::from_value(value).unwrap())
    }

    #[test]
    fn test_plain_reader_is_verbatim_and_stable() {
        let record = tweet(json!({"text": "hello", "id": 10}));

        let first = record.value("text");
        let second = record.value("text");
        assert_eq!(first, &json!("hello"));
        assert!(std::ptr::eq(first, second));
        assert!(record.value("id").is_number());
    }

    #[test]
    fn test_plain_reader_borrows_from_map() {
        let record = tweet(json!({"text": {"entities": [1, 2, 3]}}));

        assert!(std::ptr::eq(record.value("text"), record.raw_attributes().get("text")));
        assert_eq!(record.cache.evaluated(), 1);
    }

    #[test]
    fn test_plain_absent_reads_null_and_false() {
        let record = tweet(json!({}));
        assert!(record.value("text").is_null());
        assert!(!record.flag("text"));
        assert!(!record.flag("text?"));
    }

    #[test]
    fn test_plain_predicate_truthiness() {
        let record = tweet(json!({"favorited": false, "retweet_count": 0, "text": ""}));
        assert!(!record.flag("favorited"));
        assert!(record.flag("retweet_count"));
        assert!(record.flag("text"));
    }

    #[test]
    fn test_undeclared_names() {
        let record = tweet(json!({"lang": "en"}));
        assert!(record.value("lang").is_null());
        assert!(!record.flag("lang"));
        assert!(record.indexed_get("lang").unwrap().is_none());
        assert!(matches!(
            record.uri("lang"),
            Err(RecordError::UnknownAccessor { record: "Tweet", .. })
        ));
    }

    #[test]
    fn test_object_reader_wraps_nested_map() {
        let record = tweet(json!({"user": {"id": 7, "screen_name": "sferik"}}));

        let user = record.object::<User>("user").unwrap();
        assert!(user.is_present());
        assert_eq!(user.base().value("screen_name"), "sferik");
        assert_eq!(Value::from(user.raw_attributes().clone()), json!({"id": 7, "screen_name": "sferik"}));
        assert!(record.flag("user"));
    }

    #[test]
    fn test_object_reader_returns_null_object() {
        let record = tweet(json!({"user": null}));

        let user = record.object::<User>("user").unwrap();
        assert!(user.is_null());
        assert!(user.get().is_none());
        assert!(user.base().value("screen_name").is_null());
        assert!(!record.flag("user?"));
    }

    #[test]
    fn test_object_reader_is_memoized() {
        let record = tweet(json!({"user": {"id": 1}}));
        let first = record.object::<User>("user").unwrap().record() as *const User;
        let second = record.object::<User>("user").unwrap().record() as *const User;
        assert_eq!(first, second);
    }

    #[test]
    fn test_object_reader_rejects_scalar() {
        let record = tweet(json!({"user": "sferik"}));
        let err = record.object::<User>("user").unwrap_err();
        assert!(matches!(err, RecordError::NotAnObject { found: "a string", .. }));
        // Still failing: failures are not cached.
        assert!(record.object::<User>("user").is_err());
    }

    #[test]
    fn test_object_reader_wrong_type() {
        let record = tweet(json!({"user": {"id": 1}}));
        let err = record.object::<RecordBase>("user").unwrap_err();
        assert!(matches!(err, RecordError::WrapperMismatch { ref declared, requested: "RecordBase", .. } if declared == "User"));
    }

    #[test]
    fn test_two_key_object_promotes_into_copy() {
        let record = tweet(json!({"place": {"name": "Home"}, "id": 3, "text": "t"}));

        let place = record.object::<RecordBase>("place").unwrap();
        assert_eq!(
            Value::from(place.raw_attributes().clone()),
            json!({"venue": {"name": "Home"}, "id": 3, "text": "t"})
        );
        assert!(record.raw_attributes().contains_key("place"));
    }

    #[test]
    fn test_uri_parses_and_aliases() {
        let record = tweet(json!({"expanded_uri": "https://example.com/path"}));

        let uri = record.uri("expanded_uri").unwrap().unwrap();
        let url = record.uri("expanded_url").unwrap().unwrap();
        assert!(std::ptr::eq(uri, url));
        assert_eq!(uri.path(), "/path");
        assert!(record.flag("expanded_uri?"));
        assert!(record.flag("expanded_url?"));
    }

    #[test]
    fn test_uri_reads_url_spelled_payload() {
        let record = tweet(json!({"expanded_url": "http://t.co/abc"}));
        assert_eq!(record.uri("expanded_uri").unwrap().map(Url::as_str), Some("http://t.co/abc"));
        assert!(record.flag("expanded_uri"));
    }

    #[test]
    fn test_uri_absent_is_none() {
        let record = tweet(json!({}));
        assert_eq!(record.uri("expanded_uri").unwrap(), None);
        assert!(!record.flag("expanded_url"));
    }

    #[test]
    fn test_malformed_uri_fails_every_time() {
        let record = tweet(json!({"expanded_uri": "not a uri"}));

        for _ in 0..2 {
            let err = record.uri("expanded_uri").unwrap_err();
            assert!(matches!(err, RecordError::MalformedUri { ref raw, .. } if raw == "not a uri"));
        }
        assert!(record.indexed_get("expanded_url").is_err());
        // The predicate only looks at presence.
        assert!(record.flag("expanded_uri"));
    }

    #[test]
    fn test_uri_rejects_non_string() {
        let record = tweet(json!({"expanded_uri": 12}));
        assert!(matches!(
            record.uri("expanded_uri"),
            Err(RecordError::UriNotAString { found: "a number", .. })
        ));
    }

    #[test]
    fn test_kind_mismatch() {
        let record = tweet(json!({"text": "x"}));
        assert!(matches!(record.uri("text"), Err(RecordError::KindMismatch { declared: "plain", .. })));
        assert!(matches!(
            record.object::<User>("expanded_uri"),
            Err(RecordError::KindMismatch { declared: "uri", .. })
        ));
    }

    #[test]
    fn test_display_uri_both_directions() {
        let record = tweet(json!({"display_url": "example.com/a"}));

        assert_eq!(record.value("display_uri"), &json!("example.com/a"));
        assert!(std::ptr::eq(record.value("display_uri"), record.value("display_url")));
        assert!(record.flag("display_uri?"));
        assert_eq!(
            record.indexed_get("display_uri").unwrap(),
            Some(Attr::Value(record.value("display_uri")))
        );
    }

    #[test]
    fn test_indexed_get_by_role() {
        let record = tweet(json!({"text": "x", "user": {"id": 2}}));

        assert_eq!(record.indexed_get("text?").unwrap(), Some(Attr::Flag(true)));
        let user = record.indexed_get("user").unwrap().and_then(|attr| attr.as_object()).unwrap();
        assert_eq!(user.type_name(), "User");
        assert!(user.downcast::<User>().is_some());
    }

    #[test]
    fn test_memo_slots_fill_on_first_access_only() {
        let record = tweet(json!({"text": "x"}));
        assert_eq!(record.cache.evaluated(), 0);

        record.value("text");
        record.value("text");
        record.flag("text");
        assert_eq!(record.cache.evaluated(), 2);
    }

    #[test]
    fn test_bare_record_round_trips() {
        let raw = json!({"anything": [1, {"nested": true}], "else": null});
        let record: RecordBase = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
        assert_eq!(Value::from(record.into_raw_attributes()), raw);
    }

    #[test]
    fn test_new_from_none_is_empty() {
        let record = RecordBase::new(None::<AttributeMap>);
        assert!(record.raw_attributes().is_empty());
        assert!(record.to_h().is_empty());
    }
}
