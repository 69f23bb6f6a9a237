//! Accessor name derivation.
//!
//! | Declared name | Derived name | Rule |
//! |---------------|--------------|------|
//! | `name` | `name?` | [`predicate_name`] |
//! | `expanded_uri` | `expanded_url` | [`url_companion`] |
//! | `media_uri_https` | `media_url_https` | [`url_companion`] |

/// Name of the predicate accessor for a reader.
#[inline]
pub fn predicate_name(reader: &str) -> String {
    format!("{reader}?")
}

/// Derive the `url` spelling of a `uri` field name.
///
/// The name is split on `_` and the first segment equal to `uri` is
/// replaced by `url`. Returns `None` when there is no such segment; a
/// substring match such as `security` does not count.
pub fn url_companion(uri_name: &str) -> Option<String> {
    let mut segments: Vec<&str> = uri_name.split('_').collect();
    let index = segments.iter().position(|segment| *segment == "uri")?;
    segments[index] = "url";
    Some(segments.join("_"))
}
