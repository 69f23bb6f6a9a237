//! Dynamically typed accessor results.

use serde_json::Value;
use url::Url;

use crate::attributes::is_truthy;
use crate::traits::Record;

use super::ObjectRef;

/// Result of reading an accessor by name through
/// [`indexed_get`](crate::RecordBase::indexed_get).
///
/// | Variant | Produced by |
/// |---------|-------------|
/// | `Value` | Plain and display-URI readers |
/// | `Flag` | Any `?` predicate |
/// | `Uri` | URI readers |
/// | `Object` | Object readers |
#[derive(Clone, Copy, Debug)]
pub enum Attr<'a> {
    /// Raw value, `null` when absent.
    Value(&'a Value),
    /// Predicate result.
    Flag(bool),
    /// Parsed URI, `None` when absent.
    Uri(Option<&'a Url>),
    /// Nested record or the null object.
    Object(ObjectRef<'a, dyn Record>),
}

impl<'a> Attr<'a> {
    /// The raw value, if this is a plain reader result.
    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            Attr::Value(value) => Some(*value),
            _ => None,
        }
    }

    /// The predicate result, if this is a predicate.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Attr::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// The parsed URI, if this is a present URI reader result.
    pub fn as_uri(&self) -> Option<&'a Url> {
        match self {
            Attr::Uri(uri) => *uri,
            _ => None,
        }
    }

    /// The nested record reference, if this is an object reader result.
    pub fn as_object(&self) -> Option<ObjectRef<'a, dyn Record>> {
        match self {
            Attr::Object(object) => Some(*object),
            _ => None,
        }
    }

    /// Truthiness of the result: absent values, `false` and the null object
    /// are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Attr::Value(value) => is_truthy(value),
            Attr::Flag(flag) => *flag,
            Attr::Uri(uri) => uri.is_some(),
            Attr::Object(object) => object.is_present(),
        }
    }
}

impl PartialEq for Attr<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Attr::Value(a), Attr::Value(b)) => a == b,
            (Attr::Flag(a), Attr::Flag(b)) => a == b,
            (Attr::Uri(a), Attr::Uri(b)) => a == b,
            (Attr::Object(a), Attr::Object(b)) => {
                a.is_present() == b.is_present()
                    && a.type_name() == b.type_name()
                    && a.raw_attributes() == b.raw_attributes()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttributeMap, RecordBase};
    use serde_json::json;

    #[test]
    fn test_truthiness_by_variant() {
        let null = json!(null);
        let zero = json!(0);
        let empty = RecordBase::new(AttributeMap::new());

        assert!(!Attr::Value(&null).is_truthy());
        assert!(Attr::Value(&zero).is_truthy());
        assert!(!Attr::Flag(false).is_truthy());
        assert!(!Attr::Uri(None).is_truthy());
        assert!(!Attr::Object(ObjectRef::new(&empty as &dyn Record, false)).is_truthy());
    }

    #[test]
    fn test_variant_accessors() {
        let url = Url::parse("https://example.com/a").unwrap();
        let value = json!("x");

        assert_eq!(Attr::Uri(Some(&url)).as_uri(), Some(&url));
        assert_eq!(Attr::Value(&value).as_value(), Some(&value));
        assert_eq!(Attr::Flag(true).as_flag(), Some(true));
        assert_eq!(Attr::Flag(true).as_value(), None);
    }

    #[test]
    fn test_equality_compares_contents() {
        let a = json!({"k": 1});
        let b = json!({"k": 1});
        assert_eq!(Attr::Value(&a), Attr::Value(&b));
        assert_ne!(Attr::Flag(true), Attr::Value(&a));
    }
}
