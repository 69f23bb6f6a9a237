//! The declaration vocabulary.
//!
//! [`SchemaBuilder`] offers the four declaration forms a record type uses to
//! describe its fields. The `#[record(...)]` attribute macro expands into
//! exactly these calls, so hand-written and generated record types share one
//! implementation.
//!
//! | Form | Registers | Accessors |
//! |------|-----------|-----------|
//! | [`attr_reader`](SchemaBuilder::attr_reader) | one plain field per name | `name`, `name?` |
//! | [`object_attr_reader`](SchemaBuilder::object_attr_reader) | one object field | `key1`, `key1?` |
//! | [`uri_attr_reader`](SchemaBuilder::uri_attr_reader) | one URI field per name | `x_uri`, `x_uri?`, `x_url`, `x_url?` |
//! | [`display_uri_attr_reader`](SchemaBuilder::display_uri_attr_reader) | the display URL field | `display_url`, `display_url?`, `display_uri`, `display_uri?` |

use rustc_hash::FxHashMap;

use crate::errors::SchemaError;
use crate::traits::RecordType;

use super::descriptor::{AttributeDescriptor, AttributeKind, Role, WrapperType};
use super::naming::url_companion;
use super::{Accessor, Schema};

/// Builder for a record type's [`Schema`].
///
/// Declarations are applied in order. An invalid declaration (a name that is
/// already taken, or a URI name without a `uri` segment) is skipped and the
/// first registration stays in effect. [`build`](Self::build) logs skipped
/// declarations; [`try_build`](Self::try_build) reports the first one.
///
/// # Example
///
/// ```
/// use recordkit::{RecordBase, Schema};
///
/// let schema = Schema::builder("Entity")
///     .attr_reader(&["id", "text"])
///     .object_attr_reader::<RecordBase>("user", None)
///     .uri_attr_reader(&["expanded_uri"])
///     .display_uri_attr_reader()
///     .try_build()?;
///
/// assert!(schema.contains("expanded_url?"));
/// assert!(schema.contains("display_uri"));
/// # Ok::<(), recordkit::SchemaError>(())
/// ```
#[derive(Debug)]
pub struct SchemaBuilder {
    type_name: &'static str,
    descriptors: Vec<AttributeDescriptor>,
    accessors: FxHashMap<String, Accessor>,
    rejected: Vec<SchemaError>,
}

impl SchemaBuilder {
    /// Start a schema for the record type named `type_name`.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            descriptors: Vec::new(),
            accessors: FxHashMap::default(),
            rejected: Vec::new(),
        }
    }

    /// Declare plain fields read verbatim from the attribute map.
    pub fn attr_reader(mut self, names: &[&str]) -> Self {
        for name in names {
            self.register(AttributeKind::Plain, name, None, None, Vec::new());
        }
        self
    }

    /// Declare a field that wraps its nested map into the record type `T`.
    ///
    /// Without `key2`, `T` is built from the map stored at `key1`. With
    /// `key2`, `T` is built from a copy of the whole enclosing map in which
    /// the `key1` entry has been moved to `key2`.
    pub fn object_attr_reader<T: RecordType>(mut self, key1: &str, key2: Option<&str>) -> Self {
        self.register(
            AttributeKind::Object,
            key1,
            key2,
            Some(WrapperType::of::<T>()),
            Vec::new(),
        );
        self
    }

    /// Like [`object_attr_reader`](Self::object_attr_reader), resolving the
    /// wrapped type by its registered name on first read.
    #[cfg(feature = "registry")]
    pub fn object_attr_reader_named(mut self, type_name: &str, key1: &str, key2: Option<&str>) -> Self {
        self.register(
            AttributeKind::Object,
            key1,
            key2,
            Some(WrapperType::Named(type_name.to_owned())),
            Vec::new(),
        );
        self
    }

    /// Declare URI fields, each aliased under its `url` spelling.
    pub fn uri_attr_reader(mut self, names: &[&str]) -> Self {
        for name in names {
            match url_companion(name) {
                Some(companion) => {
                    self.register(AttributeKind::Uri, name, None, None, vec![companion]);
                }
                None => self.rejected.push(SchemaError::MissingUriSegment {
                    record: self.type_name,
                    name: (*name).to_owned(),
                }),
            }
        }
        self
    }

    /// Declare `display_url`, aliased as `display_uri`.
    pub fn display_uri_attr_reader(mut self) -> Self {
        self.register(
            AttributeKind::DisplayUri,
            "display_url",
            None,
            None,
            vec!["display_uri".to_owned()],
        );
        self
    }

    /// Finish the schema, logging any skipped declaration.
    pub fn build(self) -> Schema {
        for rejected in &self.rejected {
            tracing::warn!(record = self.type_name, error = %rejected, "skipping invalid field declaration");
        }
        self.finish()
    }

    /// Finish the schema, failing on the first skipped declaration.
    ///
    /// # Errors
    ///
    /// * [`SchemaError::DuplicateAccessor`] - A name was declared twice
    /// * [`SchemaError::MissingUriSegment`] - A URI name has no `uri` segment
    pub fn try_build(mut self) -> Result<Schema, SchemaError> {
        if !self.rejected.is_empty() {
            return Err(self.rejected.swap_remove(0));
        }
        Ok(self.finish())
    }

    fn finish(self) -> Schema {
        tracing::debug!(
            record = self.type_name,
            fields = self.descriptors.len(),
            accessors = self.accessors.len(),
            "registered record schema"
        );
        Schema {
            type_name: self.type_name,
            descriptors: self.descriptors,
            accessors: self.accessors,
        }
    }

    fn register(
        &mut self,
        kind: AttributeKind,
        key: &str,
        rename: Option<&str>,
        wrapper: Option<WrapperType>,
        aliases: Vec<String>,
    ) {
        let descriptor = AttributeDescriptor {
            name: key.to_owned(),
            key: key.to_owned(),
            rename: rename.map(str::to_owned),
            wrapper,
            kind,
            aliases,
            ordinal: self.descriptors.len(),
        };

        let names: Vec<(String, Role)> = descriptor.accessor_names().collect();
        if let Some((taken, _)) = names.iter().find(|(name, _)| self.accessors.contains_key(name)) {
            self.rejected.push(SchemaError::DuplicateAccessor {
                record: self.type_name,
                name: taken.clone(),
            });
            return;
        }

        for (name, role) in names {
            self.accessors.insert(
                name,
                Accessor {
                    descriptor: descriptor.ordinal,
                    role,
                },
            );
        }
        self.descriptors.push(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordBase;

    #[test]
    fn test_attr_reader_registers_reader_and_predicate() {
        let schema = SchemaBuilder::new("Place").attr_reader(&["name", "country"]).try_build().unwrap();

        assert_eq!(schema.descriptors().len(), 2);
        let (descriptor, role) = schema.resolve("country?").unwrap();
        assert_eq!(descriptor.name(), "country");
        assert_eq!(role, Role::Predicate);
        assert_eq!(descriptor.kind(), AttributeKind::Plain);
    }

    #[test]
    fn test_uri_reader_aliases_url_spelling() {
        let schema = SchemaBuilder::new("Entity").uri_attr_reader(&["expanded_uri"]).try_build().unwrap();

        let (uri, _) = schema.resolve("expanded_uri").unwrap();
        let (url, role) = schema.resolve("expanded_url").unwrap();
        assert_eq!(uri.ordinal(), url.ordinal());
        assert_eq!(role, Role::Reader);
        assert_eq!(uri.aliases(), ["expanded_url".to_owned()]);
        assert_eq!(schema.resolve("expanded_url?").unwrap().1, Role::Predicate);
    }

    #[test]
    fn test_display_uri_pair() {
        let schema = SchemaBuilder::new("Entity").display_uri_attr_reader().try_build().unwrap();

        let descriptor = schema.descriptor("display_uri").unwrap();
        assert_eq!(descriptor.key(), "display_url");
        assert_eq!(descriptor.kind(), AttributeKind::DisplayUri);
        for name in ["display_url", "display_url?", "display_uri", "display_uri?"] {
            assert!(schema.contains(name), "{name}");
        }
    }

    #[test]
    fn test_object_reader_records_rename_and_wrapper() {
        let schema = SchemaBuilder::new("Tweet")
            .object_attr_reader::<RecordBase>("user", Some("status"))
            .try_build()
            .unwrap();

        let descriptor = schema.descriptor("user").unwrap();
        assert_eq!(descriptor.rename(), Some("status"));
        assert_eq!(descriptor.wrapper().unwrap().type_name(), "RecordBase");
    }

    #[test]
    fn test_duplicate_is_rejected_and_first_wins() {
        let builder = SchemaBuilder::new("User")
            .attr_reader(&["id"])
            .object_attr_reader::<RecordBase>("id", None);

        let err = builder.try_build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateAccessor {
                record: "User",
                name: "id".into()
            }
        );

        let schema = SchemaBuilder::new("User")
            .attr_reader(&["id"])
            .object_attr_reader::<RecordBase>("id", None)
            .build();
        assert_eq!(schema.descriptors().len(), 1);
        assert_eq!(schema.descriptor("id").unwrap().kind(), AttributeKind::Plain);
    }

    #[test]
    fn test_alias_collision_is_rejected() {
        let err = SchemaBuilder::new("Entity")
            .attr_reader(&["expanded_url"])
            .uri_attr_reader(&["expanded_uri"])
            .try_build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateAccessor { ref name, .. } if name == "expanded_url"));
    }

    #[test]
    fn test_uri_name_without_segment_is_rejected() {
        let err = SchemaBuilder::new("Entity").uri_attr_reader(&["link"]).try_build().unwrap_err();
        assert!(matches!(err, SchemaError::MissingUriSegment { .. }));

        let schema = SchemaBuilder::new("Entity").uri_attr_reader(&["link"]).build();
        assert!(schema.descriptors().is_empty());
    }

    #[test]
    fn test_slots_follow_registration_order() {
        let schema = SchemaBuilder::new("Entity").attr_reader(&["a", "b"]).display_uri_attr_reader().build();

        assert_eq!(schema.slot_count(), 6);
        let b = schema.descriptor("b").unwrap();
        assert_eq!((b.reader_slot(), b.predicate_slot()), (2, 3));
    }
}
