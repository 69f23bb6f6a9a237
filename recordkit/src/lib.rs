//! # recordkit - Typed Records over Raw Attribute Maps
//!
//! recordkit models externally sourced records (the JSON objects a remote API
//! returns) as typed, read-only Rust values. A record keeps the decoded
//! attribute map exactly as received and exposes declared fields through
//! memoized accessors; nothing is parsed or wrapped until it is read, and
//! nothing is parsed or wrapped twice.
//!
//! ## Philosophy
//!
//! - **Declare once**: one line per field yields a reader and a predicate
//! - **Schema tolerant**: missing keys read as absent, unknown keys are kept
//! - **Lazy and memoized**: each accessor computes at most once per instance
//! - **Lossless**: the raw map round-trips, including fields nobody declared
//!
//! ## Declaration Forms
//!
//! | Form | Reader | Predicate | Aliases |
//! |------|--------|-----------|---------|
//! | `attr_reader(name, ..)` | `&Value` | `has_name()` | - |
//! | `object_attr_reader(Type, key)` | [`ObjectRef<Type>`] | `has_key()` | - |
//! | `object_attr_reader(Type, key, rename)` | [`ObjectRef<Type>`] | `has_key()` | - |
//! | `uri_attr_reader(x_uri, ..)` | `Option<&Url>` | `has_x_uri()` | `x_url`, `has_x_url()` |
//! | `display_uri_attr_reader` | `&Value` | `has_display_url()` | `display_uri`, `has_display_uri()` |
//!
//! ## Quick Start
//!
//! ```ignore
//! use recordkit::record;
//!
//! #[record(attr_reader(id, screen_name))]
//! pub struct User;
//!
//! #[record(
//!     attr_reader(id, text, favorited),
//!     object_attr_reader(User, user),
//!     uri_attr_reader(expanded_uri),
//!     display_uri_attr_reader,
//! )]
//! pub struct Tweet;
//!
//! let tweet = Tweet::from_value(payload)?;
//!
//! tweet.text();                 // &Value
//! tweet.has_favorited();        // bool
//! tweet.user()?.screen_name();  // null object when "user" is absent
//! tweet.expanded_url()?;        // Option<&Url>, same memo as expanded_uri()
//! tweet.indexed_get("text?")?;  // Option<Attr>, None for undeclared names
//! ```
//!
//! ## Module Organization
//!
//! - [`attributes`]: [`AttributeMap`], the raw backing store
//! - [`memo`]: per-instance memo slots
//! - [`schema`]: descriptors and the [`SchemaBuilder`] declaration vocabulary
//! - [`wrappers`]: [`ObjectRef`] and [`Attr`] result views
//! - `registry` (feature `registry`): record types by name
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `macros` | yes | The [`record`] attribute macro |
//! | `registry` | no | [`registry`] lookup and by-name object fields |

extern crate self as recordkit;

pub mod attributes;
mod errors;
pub mod memo;
mod record;
#[cfg(feature = "registry")]
pub mod registry;
pub mod schema;
mod traits;
pub mod wrappers;

pub use attributes::{is_truthy, AttributeMap};
pub use errors::{RecordError, SchemaError};
pub use memo::{MemoCache, MemoSlot};
pub use record::RecordBase;
pub use schema::{AttributeDescriptor, AttributeKind, Role, Schema, SchemaBuilder, WrapperType};
pub use traits::{construct_boxed, Record, RecordType};
pub use wrappers::{Attr, ObjectRef};

// Re-export the attribute macro
#[cfg(feature = "macros")]
pub use recordkit_macros::record;

// Re-exports used by generated code
#[cfg(feature = "registry")]
#[doc(hidden)]
pub use inventory;
pub use serde;
pub use serde_json::{self, Value};
pub use url::{self, Url};
