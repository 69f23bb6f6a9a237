//! Field descriptors.

use std::fmt;

use serde_json::Value;

use crate::attributes::AttributeMap;
use crate::errors::RecordError;
use crate::traits::{construct_boxed, Record, RecordType};

/// How a declared field turns its raw value into an accessor result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Raw value returned verbatim.
    Plain,
    /// Nested attribute map wrapped into another record type.
    Object,
    /// Raw string parsed into a [`Url`](url::Url).
    Uri,
    /// `display_url` / `display_uri` pair, returned verbatim.
    DisplayUri,
}

impl AttributeKind {
    /// Lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Plain => "plain",
            AttributeKind::Object => "object",
            AttributeKind::Uri => "uri",
            AttributeKind::DisplayUri => "display uri",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an accessor name resolves to the reader or the predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// `name`: the value itself.
    Reader,
    /// `name?`: whether the value is present.
    Predicate,
}

/// The record type an object field wraps its nested map into.
#[derive(Clone)]
pub enum WrapperType {
    /// A Rust type known at declaration time.
    Static {
        /// Resolves the wrapped type's schema name. Deferred so mutually
        /// nesting record types can declare each other.
        type_name: fn() -> &'static str,
        /// Builds the wrapped record.
        construct: fn(AttributeMap) -> Box<dyn Record>,
    },
    /// A type resolved through the [`registry`](crate::registry) on first read.
    #[cfg(feature = "registry")]
    Named(String),
}

impl WrapperType {
    /// Wrapper for the record type `T`.
    pub fn of<T: RecordType>() -> Self {
        WrapperType::Static {
            type_name: schema_name::<T>,
            construct: construct_boxed::<T>,
        }
    }

    /// Schema name of the wrapped type.
    pub fn type_name(&self) -> &str {
        match self {
            WrapperType::Static { type_name, .. } => type_name(),
            #[cfg(feature = "registry")]
            WrapperType::Named(name) => name,
        }
    }

    /// Construct the wrapped record from a nested attribute map.
    ///
    /// # Errors
    ///
    /// * `RecordError::UnknownRecordType` - A named wrapper is not registered
    pub fn construct(&self, attrs: AttributeMap) -> Result<Box<dyn Record>, RecordError> {
        match self {
            WrapperType::Static { construct, .. } => Ok(construct(attrs)),
            #[cfg(feature = "registry")]
            WrapperType::Named(name) => crate::registry::construct(name, attrs),
        }
    }
}

impl fmt::Debug for WrapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapperType::Static { .. } => f.write_str("WrapperType::Static"),
            #[cfg(feature = "registry")]
            WrapperType::Named(name) => f.debug_tuple("WrapperType::Named").field(name).finish(),
        }
    }
}

fn schema_name<T: RecordType>() -> &'static str {
    T::schema().type_name()
}

/// Declaration of one field of a record type.
///
/// Descriptors are created by [`SchemaBuilder`](super::SchemaBuilder) and
/// are immutable once registered. Each owns two memo slots: one for its
/// reader and one for its predicate.
#[derive(Clone, Debug)]
pub struct AttributeDescriptor {
    pub(super) name: String,
    pub(super) key: String,
    pub(super) rename: Option<String>,
    pub(super) wrapper: Option<WrapperType>,
    pub(super) kind: AttributeKind,
    pub(super) aliases: Vec<String>,
    pub(super) ordinal: usize,
}

impl AttributeDescriptor {
    /// Primary accessor name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw key read from the attribute map.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key the raw value is moved to when building a nested object from the
    /// whole enclosing map. Only set for two-key object fields.
    #[inline]
    pub fn rename(&self) -> Option<&str> {
        self.rename.as_deref()
    }

    /// Wrapped record type of an object field.
    #[inline]
    pub fn wrapper(&self) -> Option<&WrapperType> {
        self.wrapper.as_ref()
    }

    /// Field kind.
    #[inline]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Alternate accessor names served by this descriptor.
    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Registration order within the schema.
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Memo slot of the reader.
    #[inline]
    pub fn reader_slot(&self) -> usize {
        self.ordinal * 2
    }

    /// Memo slot of the predicate.
    #[inline]
    pub fn predicate_slot(&self) -> usize {
        self.ordinal * 2 + 1
    }

    /// Memo slot for the given role.
    #[inline]
    pub fn slot(&self, role: Role) -> usize {
        match role {
            Role::Reader => self.reader_slot(),
            Role::Predicate => self.predicate_slot(),
        }
    }

    /// The raw value this field reads.
    ///
    /// URI and display-URI fields fall back to their alias keys when the
    /// primary key is absent, so a payload spelling the field either way is
    /// served by the same accessor.
    pub fn raw_value<'a>(&self, attrs: &'a AttributeMap) -> &'a Value {
        let primary = attrs.get(&self.key);
        match self.kind {
            AttributeKind::Uri | AttributeKind::DisplayUri if primary.is_null() => self
                .aliases
                .iter()
                .map(|alias| attrs.get(alias))
                .find(|value| !value.is_null())
                .unwrap_or(primary),
            _ => primary,
        }
    }

    /// Every accessor name this descriptor answers to, with its role.
    pub fn accessor_names(&self) -> impl Iterator<Item = (String, Role)> + '_ {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .flat_map(|name| {
                [
                    (name.to_owned(), Role::Reader),
                    (super::naming::predicate_name(name), Role::Predicate),
                ]
            })
    }
}
