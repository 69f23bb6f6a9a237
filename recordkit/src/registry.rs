//! Link-time registry of record types, keyed by schema name.
//!
//! Enabled by the `registry` feature. Every type declared with `#[record]`
//! submits a [`Registration`] through [`inventory`], which lets object fields
//! name their wrapped type as a string
//! ([`SchemaBuilder::object_attr_reader_named`](crate::SchemaBuilder::object_attr_reader_named))
//! and lets callers construct records whose type is only known at runtime.
//!
//! # Example
//!
//! ```ignore
//! let record = recordkit::registry::construct("User", attrs)?;
//! assert_eq!(record.type_name(), "User");
//! ```

use crate::attributes::AttributeMap;
use crate::errors::RecordError;
use crate::traits::Record;

/// A constructible record type.
#[derive(Clone, Copy, Debug)]
pub struct Registration {
    type_name: &'static str,
    construct: fn(AttributeMap) -> Box<dyn Record>,
}

impl Registration {
    /// Register `construct` under `type_name`.
    pub const fn new(type_name: &'static str, construct: fn(AttributeMap) -> Box<dyn Record>) -> Self {
        Self { type_name, construct }
    }

    /// Registered name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Construct a record of this type.
    #[inline]
    pub fn construct(&self, attrs: AttributeMap) -> Box<dyn Record> {
        (self.construct)(attrs)
    }
}

inventory::collect!(Registration);

/// Find the registration for `type_name`.
pub fn lookup(type_name: &str) -> Option<&'static Registration> {
    inventory::iter::<Registration>
        .into_iter()
        .find(|registration| registration.type_name == type_name)
}

/// Construct a record of the type registered as `type_name`.
///
/// # Errors
///
/// * [`RecordError::UnknownRecordType`] - Nothing is registered under that name
pub fn construct(type_name: &str, attrs: AttributeMap) -> Result<Box<dyn Record>, RecordError> {
    lookup(type_name)
        .map(|registration| registration.construct(attrs))
        .ok_or_else(|| RecordError::UnknownRecordType(type_name.to_owned()))
}

/// Names of all registered record types.
pub fn registered() -> impl Iterator<Item = &'static str> {
    inventory::iter::<Registration>
        .into_iter()
        .map(Registration::type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{construct_boxed, RecordBase, RecordType, Schema};
    use serde_json::json;
    use std::sync::OnceLock;

    inventory::submit! {
        Registration::new("RegistryProbe", construct_boxed::<RecordBase>)
    }

    #[test]
    fn test_lookup_registered() {
        assert!(lookup("RegistryProbe").is_some());
        assert!(registered().any(|name| name == "RegistryProbe"));
        assert!(lookup("Missing").is_none());
    }

    #[test]
    fn test_construct_unknown_type() {
        let err = construct("Missing", AttributeMap::new()).unwrap_err();
        assert!(matches!(err, RecordError::UnknownRecordType(ref name) if name == "Missing"));
    }

    #[test]
    fn test_named_object_field_resolves_on_read() {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        let schema = SCHEMA.get_or_init(|| {
            Schema::builder("Holder")
                .object_attr_reader_named("RegistryProbe", "probe", None)
                .object_attr_reader_named("Missing", "ghost", None)
                .build()
        });
        let record = RecordBase::with_schema(
            schema,
            AttributeMap::from_value(json!({"probe": {"a": 1}, "ghost": {"b": 2}})).unwrap(),
        );

        let probe = record.object::<RecordBase>("probe").unwrap();
        assert_eq!(probe.raw_attributes().get("a"), &json!(1));
        assert!(matches!(
            record.object::<RecordBase>("ghost"),
            Err(RecordError::UnknownRecordType(_))
        ));
        assert_eq!(<RecordBase as RecordType>::schema().type_name(), "RecordBase");
    }

    #[test]
    fn test_absent_named_object_does_not_resolve() {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        let schema = SCHEMA.get_or_init(|| {
            Schema::builder("Sparse")
                .object_attr_reader_named("Unregistered", "ghost", None)
                .build()
        });
        let record = RecordBase::with_schema(schema, AttributeMap::new());

        let ghost = record.object::<RecordBase>("ghost").unwrap();
        assert!(ghost.is_null());
        assert!(ghost.raw_attributes().is_empty());
        assert!(!record.flag("ghost"));

        let attr = record.indexed_get("ghost").unwrap().unwrap();
        assert!(attr.as_object().unwrap().is_null());
    }
}
