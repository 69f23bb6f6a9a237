//! Error types for record declaration and record reads.
//!
//! Two failure families exist:
//!
//! | Type | Raised by | When |
//! |------|-----------|------|
//! | [`SchemaError`] | [`SchemaBuilder::try_build`](crate::SchemaBuilder::try_build) | A declaration is invalid |
//! | [`RecordError`] | Record accessors | A present value cannot be turned into the declared shape |
//!
//! Absent values are never errors: a missing key or a JSON `null` reads as
//! `null`, `false`, `None` or the null object depending on the accessor.

use serde_json::Value;

/// Error raised while reading an accessor on a record.
///
/// Errors are never memoized. A failing accessor runs again on the next call.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The raw value of a URI field is a string but not a valid absolute URI.
    #[error("`{field}` holds a malformed URI {raw:?}: {source}")]
    MalformedUri {
        field: String,
        raw: String,
        #[source]
        source: url::ParseError,
    },

    /// The raw value of a URI field is present but not a string.
    #[error("`{field}` must be a string to parse as a URI, found {found}")]
    UriNotAString { field: String, found: &'static str },

    /// The raw value of an object field is present but not an attribute map.
    #[error("`{field}` must hold an attribute map, found {found}")]
    NotAnObject { field: String, found: &'static str },

    /// An attribute map was requested from a value that is not a JSON object.
    #[error("expected an attribute map, found {found}")]
    InvalidAttributes { found: &'static str },

    /// A typed reader was asked for a name the record type never declared.
    #[error("`{record}` has no accessor named `{name}`")]
    UnknownAccessor { record: &'static str, name: String },

    /// A typed reader was used against a field declared with another kind.
    #[error("`{record}.{name}` is declared as a {declared} field")]
    KindMismatch {
        record: &'static str,
        name: String,
        declared: &'static str,
    },

    /// An object field was read as a different record type than it wraps.
    #[error("`{field}` wraps `{declared}`, not `{requested}`")]
    WrapperMismatch {
        field: String,
        declared: String,
        requested: &'static str,
    },

    /// A wrapper type was declared by name and nothing registered that name.
    #[cfg(feature = "registry")]
    #[error("no record type registered as `{0}`")]
    UnknownRecordType(String),
}

/// Error raised for an invalid field declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// An accessor name (reader, predicate or alias) was declared twice.
    #[error("`{record}` declares `{name}` more than once")]
    DuplicateAccessor { record: &'static str, name: String },

    /// A URI field name has no `uri` segment to derive its `url` companion from.
    #[error("`{record}.{name}` has no `uri` segment to derive a `url` alias from")]
    MissingUriSegment { record: &'static str, name: String },
}

/// Name of a JSON value's kind, used in error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
