//! Per-type field declarations.
//!
//! A [`Schema`] is the registered form of a record type's declarations: the
//! ordered list of [`AttributeDescriptor`]s plus a map from every accessor
//! name (readers, `?` predicates, and derived aliases) to the descriptor and
//! role it resolves to. Schemas are built once per type, usually inside a
//! `OnceLock` emitted by the `#[record]` macro, and shared by all instances.

mod builder;
mod descriptor;
pub mod naming;

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

pub use builder::SchemaBuilder;
pub use descriptor::{AttributeDescriptor, AttributeKind, Role, WrapperType};

/// Target of an accessor name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accessor {
    /// Ordinal of the descriptor serving this name.
    pub descriptor: usize,
    /// Reader or predicate.
    pub role: Role,
}

/// Immutable field table of one record type.
#[derive(Debug)]
pub struct Schema {
    type_name: &'static str,
    descriptors: Vec<AttributeDescriptor>,
    accessors: FxHashMap<String, Accessor>,
}

impl Schema {
    /// Start declaring the schema of the record type named `type_name`.
    #[inline]
    pub fn builder(type_name: &'static str) -> SchemaBuilder {
        SchemaBuilder::new(type_name)
    }

    /// The schema with no fields, used by a bare [`RecordBase`](crate::RecordBase).
    pub fn empty() -> &'static Schema {
        static EMPTY: OnceLock<Schema> = OnceLock::new();
        EMPTY.get_or_init(|| SchemaBuilder::new("RecordBase").build())
    }

    /// Name of the record type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All descriptors in registration order.
    #[inline]
    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }

    /// Resolve an accessor name to its descriptor and role.
    pub fn resolve(&self, name: &str) -> Option<(&AttributeDescriptor, Role)> {
        let accessor = self.accessors.get(name)?;
        let descriptor = self.descriptors.get(accessor.descriptor)?;
        Some((descriptor, accessor.role))
    }

    /// The descriptor serving an accessor name, whatever its role.
    #[inline]
    pub fn descriptor(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.resolve(name).map(|(descriptor, _)| descriptor)
    }

    /// Whether `name` is a declared accessor.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Every declared accessor name, in no particular order.
    pub fn accessor_names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }

    /// Number of memo slots an instance needs.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.descriptors.len() * 2
    }
}
