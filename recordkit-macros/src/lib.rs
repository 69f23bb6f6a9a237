//! Procedural macros for recordkit.
//!
//! This crate provides the [`record`] attribute, which turns a unit struct
//! and a list of field declarations into a complete record type. Everything
//! expands to calls into the `recordkit` runtime crate; there is no separate
//! code path for generated records.
//!
//! # Available Macros
//!
//! | Macro | Type | Purpose |
//! |-------|------|---------|
//! | [`record`] | Attribute | Record struct, schema registration and typed accessors |
//!
//! # Quick Start
//!
//! ```ignore
//! use recordkit::record;
//!
//! #[record(attr_reader(id, name))]
//! pub struct Place;
//!
//! #[record(
//!     attr_reader(id, text),
//!     object_attr_reader(Place, place),
//!     object_attr_reader(Tweet, retweeted_status, status),
//!     uri_attr_reader(expanded_uri),
//!     display_uri_attr_reader,
//! )]
//! pub struct Tweet;
//! ```
//!
//! # Generated Code
//!
//! ## Items
//!
//! - `struct Tweet { base: RecordBase }`
//! - `Record` and `RecordType` impls; the schema is built once in a `OnceLock`
//! - `Debug`, `Serialize`, `Deserialize` and `From<AttributeMap>` impls
//! - Inherent `new`, `from_value`, `raw_attributes`, `to_h`,
//!   `into_raw_attributes` and `indexed_get`
//! - With the `registry` feature, an `inventory` registration under the
//!   struct's name
//!
//! ## Accessors
//!
//! | Declaration | Methods |
//! |-------------|---------|
//! | `attr_reader(text)` | `text() -> &Value`, `has_text() -> bool` |
//! | `object_attr_reader(Place, place)` | `place() -> Result<ObjectRef<Place>>`, `has_place()` |
//! | `uri_attr_reader(expanded_uri)` | `expanded_uri()`, `expanded_url() -> Result<Option<&Url>>`, `has_expanded_uri()`, `has_expanded_url()` |
//! | `display_uri_attr_reader` | `display_url()`, `display_uri() -> &Value`, `has_display_url()`, `has_display_uri()` |
//!
//! # Errors
//!
//! Declarations are checked at expansion time. A name declared twice (including
//! derived `url`, `display_*` and `has_*` names), a URI name without a `uri`
//! segment, or a name that collides with a generated method is a compile
//! error pointing at the offending identifier.

mod declaration;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, punctuated::Punctuated, Fields, ItemStruct, Meta, Token};

use declaration::{Accessor, Declaration};

/// Attribute macro declaring a record type.
///
/// Applied to a unit struct. The attribute arguments are the field
/// declarations, in the order they should be registered.
///
/// # Declaration Forms
///
/// | Form | Arguments |
/// |------|-----------|
/// | `attr_reader(a, b, ..)` | Field names |
/// | `object_attr_reader(Type, key)` | Wrapped record type, raw key of the nested map |
/// | `object_attr_reader(Type, key, rename)` | Wrapped record type, raw key moved to `rename` in a copy of the whole map |
/// | `uri_attr_reader(x_uri, ..)` | Field names containing a `uri` segment |
/// | `display_uri_attr_reader` | None |
///
/// # Example
///
/// ```ignore
/// use recordkit::record;
///
/// /// A user of the service.
/// #[record(
///     attr_reader(id, screen_name, verified),
///     uri_attr_reader(profile_image_uri_https),
/// )]
/// pub struct User;
///
/// let user = User::from_value(serde_json::json!({
///     "id": 1,
///     "screen_name": "sferik",
///     "profile_image_url_https": "https://pbs.twimg.com/a.png",
/// }))?;
///
/// assert_eq!(user.screen_name(), "sferik");
/// assert!(!user.has_verified());
/// assert!(user.profile_image_url_https()?.is_some());
/// ```
///
/// # Compile Errors
///
/// - Applied to anything but a unit struct without generics
/// - Unknown declaration form
/// - Duplicate accessor name, or one colliding with a generated method
/// - URI name without a `uri` segment
///
/// Predicates are generated as `has_<name>`, so a field literally named
/// `has_id` cannot sit next to a field `id`. Declare such a pair through
/// `SchemaBuilder` by hand, where the predicate is spelled `id?`.
///
/// # Keyword Fields
///
/// Keys that are Rust keywords are declared as raw identifiers:
/// `attr_reader(r#type)` reads the key `"type"` and generates `r#type()` and
/// `has_type()`.
#[proc_macro_attribute]
pub fn record(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr with Punctuated::<Meta, Token![,]>::parse_terminated);
    let input = parse_macro_input!(item as ItemStruct);

    match expand_record(args, &input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_record(args: Punctuated<Meta, Token![,]>, input: &ItemStruct) -> syn::Result<TokenStream2> {
    if !matches!(input.fields, Fields::Unit) {
        return Err(syn::Error::new_spanned(
            &input.fields,
            "#[record] expects a unit struct; fields are declared in the attribute",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&input.generics, "#[record] does not support generics"));
    }

    let declarations = args
        .iter()
        .map(Declaration::parse)
        .collect::<syn::Result<Vec<_>>>()?;

    let accessors: Vec<Accessor> = declarations.iter().flat_map(Declaration::accessors).collect();
    declaration::check_unique(&accessors)?;

    let name = &input.ident;
    let vis = &input.vis;
    let attrs = &input.attrs;
    let name_str = name.to_string();

    let builder_calls = declarations.iter().map(Declaration::builder_call);
    let methods = accessors.iter().map(Accessor::method);
    let registration = registration(name, &name_str);

    Ok(quote! {
        #(#attrs)*
        #vis struct #name {
            base: ::recordkit::RecordBase,
        }

        impl ::recordkit::Record for #name {
            #[inline]
            fn base(&self) -> &::recordkit::RecordBase {
                &self.base
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }

        impl ::recordkit::RecordType for #name {
            fn schema() -> &'static ::recordkit::Schema {
                static SCHEMA: ::std::sync::OnceLock<::recordkit::Schema> = ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    ::recordkit::Schema::builder(#name_str)
                        #(#builder_calls)*
                        .build()
                })
            }

            #[inline]
            fn from_base(base: ::recordkit::RecordBase) -> Self {
                Self { base }
            }
        }

        impl #name {
            /// Construct a record; missing and undeclared keys are both fine.
            #[inline]
            pub fn new(attrs: impl ::core::convert::Into<::recordkit::AttributeMap>) -> Self {
                <Self as ::recordkit::RecordType>::new(attrs)
            }

            /// Construct a record from a decoded JSON object, or `null` for an empty one.
            #[inline]
            pub fn from_value(value: ::recordkit::Value) -> ::core::result::Result<Self, ::recordkit::RecordError> {
                <Self as ::recordkit::RecordType>::from_value(value)
            }

            /// The backing attribute map, exactly as constructed.
            #[inline]
            pub fn raw_attributes(&self) -> &::recordkit::AttributeMap {
                self.base.raw_attributes()
            }

            /// Alias of `raw_attributes`.
            #[inline]
            pub fn to_h(&self) -> &::recordkit::AttributeMap {
                self.base.raw_attributes()
            }

            /// Give up the record and keep its attribute map.
            #[inline]
            pub fn into_raw_attributes(self) -> ::recordkit::AttributeMap {
                self.base.into_raw_attributes()
            }

            /// Read an accessor by name; `None` when no such accessor is declared.
            #[inline]
            pub fn indexed_get(
                &self,
                name: &str,
            ) -> ::core::result::Result<::core::option::Option<::recordkit::Attr<'_>>, ::recordkit::RecordError> {
                self.base.indexed_get(name)
            }

            #(#methods)*
        }

        impl ::core::fmt::Debug for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Debug::fmt(&self.base, f)
            }
        }

        impl ::core::convert::From<::recordkit::AttributeMap> for #name {
            fn from(attrs: ::recordkit::AttributeMap) -> Self {
                <Self as ::recordkit::RecordType>::new(attrs)
            }
        }

        impl ::recordkit::serde::Serialize for #name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::recordkit::serde::Serializer,
            {
                ::recordkit::serde::Serialize::serialize(self.base.raw_attributes(), serializer)
            }
        }

        impl<'de> ::recordkit::serde::Deserialize<'de> for #name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::recordkit::serde::Deserializer<'de>,
            {
                <::recordkit::AttributeMap as ::recordkit::serde::Deserialize<'de>>::deserialize(deserializer)
                    .map(|attrs| <Self as ::recordkit::RecordType>::new(attrs))
            }
        }

        #registration
    })
}

#[cfg(feature = "registry")]
fn registration(name: &syn::Ident, name_str: &str) -> TokenStream2 {
    quote! {
        ::recordkit::inventory::submit! {
            ::recordkit::registry::Registration::new(#name_str, ::recordkit::construct_boxed::<#name>)
        }
    }
}

#[cfg(not(feature = "registry"))]
fn registration(_name: &syn::Ident, _name_str: &str) -> TokenStream2 {
    TokenStream2::new()
}
