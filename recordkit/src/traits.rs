//! Core traits for record types.
//!
//! This module provides the two traits every record implements:
//!
//! | Trait | Object safe | Purpose |
//! |-------|-------------|---------|
//! | [`Record`] | yes | Dynamic access to any record (`&dyn Record`) |
//! | [`RecordType`] | no | Construction and the per-type [`Schema`] |
//!
//! Both are implemented by the `#[record]` attribute macro. Implement them by
//! hand only for record types that need a custom layout.

use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::attributes::AttributeMap;
use crate::errors::RecordError;
use crate::record::RecordBase;
use crate::schema::Schema;
use crate::wrappers::Attr;

/// A record backed by a [`RecordBase`].
///
/// This trait is object safe, which lets object fields hold nested records of
/// any type and lets [`indexed_get`](Self::indexed_get) return them.
///
/// # Example
///
/// ```ignore
/// fn describe(record: &dyn Record) -> Result<(), RecordError> {
///     if let Some(name) = record.indexed_get("name")? {
///         println!("{} named {:?}", record.type_name(), name);
///     }
///     Ok(())
/// }
/// ```
pub trait Record: Any + Send + Sync + fmt::Debug {
    /// The shared base holding the attribute map and memo cache.
    fn base(&self) -> &RecordBase;

    /// Upcast for downcasting to the concrete record type.
    fn as_any(&self) -> &dyn Any;

    /// Name of the record type.
    #[inline]
    fn type_name(&self) -> &'static str {
        self.base().schema().type_name()
    }

    /// The backing attribute map.
    #[inline]
    fn raw_attributes(&self) -> &AttributeMap {
        self.base().raw_attributes()
    }

    /// Read an accessor by name. See [`RecordBase::indexed_get`].
    ///
    /// # Errors
    ///
    /// Any error raised while evaluating a declared accessor.
    #[inline]
    fn indexed_get(&self, name: &str) -> Result<Option<Attr<'_>>, RecordError> {
        self.base().indexed_get(name)
    }
}

/// A concrete record type with a registered [`Schema`].
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::OnceLock;
/// use recordkit::{AttributeMap, Record, RecordBase, RecordType, Schema};
///
/// #[derive(Debug)]
/// struct Place {
///     base: RecordBase,
/// }
///
/// impl Record for Place {
///     fn base(&self) -> &RecordBase {
///         &self.base
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// impl RecordType for Place {
///     fn schema() -> &'static Schema {
///         static SCHEMA: OnceLock<Schema> = OnceLock::new();
///         SCHEMA.get_or_init(|| Schema::builder("Place").attr_reader(&["name"]).build())
///     }
///
///     fn from_base(base: RecordBase) -> Self {
///         Self { base }
///     }
/// }
///
/// let place = Place::new(AttributeMap::from_value(serde_json::json!({"name": "Paris"}))?);
/// assert_eq!(place.base().value("name"), "Paris");
/// # Ok::<(), recordkit::RecordError>(())
/// ```
pub trait RecordType: Record + Sized {
    /// The type's field declarations, built once.
    fn schema() -> &'static Schema;

    /// Wrap an already-built base.
    fn from_base(base: RecordBase) -> Self;

    /// Construct a record. `None` or an empty map gives an empty record;
    /// missing and undeclared keys are both fine.
    fn new(attrs: impl Into<AttributeMap>) -> Self {
        Self::from_base(RecordBase::with_schema(Self::schema(), attrs.into()))
    }

    /// Construct a record from a decoded JSON value.
    ///
    /// # Errors
    ///
    /// * [`RecordError::InvalidAttributes`] - The value is neither an object nor `null`
    fn from_value(value: Value) -> Result<Self, RecordError> {
        Ok(Self::new(AttributeMap::from_value(value)?))
    }
}

/// Construct `T` behind a `Box<dyn Record>`.
///
/// Used as the constructor function of object fields and registry entries.
pub fn construct_boxed<T: RecordType>(attrs: AttributeMap) -> Box<dyn Record> {
    Box::new(T::new(attrs))
}
