//! Parsing and expansion of `#[record(...)]` field declarations.

use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{ext::IdentExt, parse::ParseStream, punctuated::Punctuated, Ident, LitStr, Meta, Token, Type};

/// Methods every record type already generates.
const RESERVED: &[&str] = &[
    "new",
    "from_value",
    "raw_attributes",
    "to_h",
    "into_raw_attributes",
    "indexed_get",
    "base",
    "as_any",
    "type_name",
    "schema",
    "from_base",
];

/// One declaration form from the attribute list.
pub(crate) enum Declaration {
    Plain(Vec<Ident>),
    Object {
        wrapper: Type,
        key1: Ident,
        key2: Option<Ident>,
    },
    Uri(Vec<(Ident, Ident)>),
    DisplayUri(Span),
}

impl Declaration {
    pub(crate) fn parse(meta: &Meta) -> syn::Result<Self> {
        let form = meta
            .path()
            .get_ident()
            .map(Ident::to_string)
            .unwrap_or_default();

        match (form.as_str(), meta) {
            ("attr_reader", Meta::List(list)) => {
                let names = list.parse_args_with(Punctuated::<Ident, Token![,]>::parse_terminated)?;
                non_empty(list, names.into_iter().collect()).map(Self::Plain)
            }
            ("object_attr_reader", Meta::List(list)) => list.parse_args_with(parse_object),
            ("uri_attr_reader", Meta::List(list)) => {
                let names = list.parse_args_with(Punctuated::<Ident, Token![,]>::parse_terminated)?;
                let pairs = names
                    .into_iter()
                    .map(|name| {
                        let companion = url_companion(&key(&name)).ok_or_else(|| {
                            syn::Error::new(
                                name.span(),
                                format!("URI field `{name}` needs a `uri` segment to derive its `url` spelling"),
                            )
                        })?;
                        let companion = Ident::new(&companion, name.span());
                        Ok((name, companion))
                    })
                    .collect::<syn::Result<Vec<_>>>()?;
                non_empty(list, pairs).map(Self::Uri)
            }
            ("display_uri_attr_reader", Meta::Path(path)) => Ok(Self::DisplayUri(
                path.get_ident().map_or_else(Span::call_site, Ident::span),
            )),
            ("display_uri_attr_reader", _) => Err(syn::Error::new_spanned(
                meta,
                "`display_uri_attr_reader` takes no arguments",
            )),
            _ => Err(syn::Error::new_spanned(
                meta.path(),
                "expected `attr_reader(..)`, `object_attr_reader(..)`, `uri_attr_reader(..)` or `display_uri_attr_reader`",
            )),
        }
    }

    /// The `SchemaBuilder` call registering this declaration.
    pub(crate) fn builder_call(&self) -> TokenStream2 {
        match self {
            Self::Plain(names) => {
                let names = names.iter().map(lit);
                quote! { .attr_reader(&[#(#names),*]) }
            }
            Self::Object { wrapper, key1, key2 } => {
                let key1 = lit(key1);
                let key2 = match key2 {
                    Some(key2) => {
                        let key2 = lit(key2);
                        quote! { ::core::option::Option::Some(#key2) }
                    }
                    None => quote! { ::core::option::Option::None },
                };
                quote! { .object_attr_reader::<#wrapper>(#key1, #key2) }
            }
            Self::Uri(pairs) => {
                let names = pairs.iter().map(|(name, _)| lit(name));
                quote! { .uri_attr_reader(&[#(#names),*]) }
            }
            Self::DisplayUri(_) => quote! { .display_uri_attr_reader() },
        }
    }

    /// Generated methods, readers before predicates per field.
    pub(crate) fn accessors(&self) -> Vec<Accessor> {
        match self {
            Self::Plain(names) => names
                .iter()
                .flat_map(|name| [Accessor::reader(name, name, Body::Value), Accessor::predicate(name, name)])
                .collect(),
            Self::Object { wrapper, key1, .. } => vec![
                Accessor::reader(key1, key1, Body::Object(wrapper.clone())),
                Accessor::predicate(key1, key1),
            ],
            Self::Uri(pairs) => pairs
                .iter()
                .flat_map(|(name, companion)| {
                    [
                        Accessor::reader(name, name, Body::Uri),
                        Accessor::reader(companion, name, Body::Uri),
                        Accessor::predicate(name, name),
                        Accessor::predicate(companion, name),
                    ]
                })
                .collect(),
            Self::DisplayUri(span) => {
                let url = Ident::new("display_url", *span);
                let uri = Ident::new("display_uri", *span);
                vec![
                    Accessor::reader(&url, &url, Body::Value),
                    Accessor::reader(&uri, &url, Body::Value),
                    Accessor::predicate(&url, &url),
                    Accessor::predicate(&uri, &url),
                ]
            }
        }
    }
}

fn parse_object(input: ParseStream<'_>) -> syn::Result<Declaration> {
    let wrapper: Type = input.parse()?;
    input.parse::<Token![,]>()?;
    let key1: Ident = input.parse()?;

    let mut key2 = None;
    if input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
        key2 = Some(input.parse::<Ident>()?);
        input.parse::<Option<Token![,]>>()?;
    }
    if !input.is_empty() {
        return Err(input.error("expected `object_attr_reader(Type, key)` or `object_attr_reader(Type, key, rename)`"));
    }
    Ok(Declaration::Object { wrapper, key1, key2 })
}

fn non_empty<T>(list: &syn::MetaList, items: Vec<T>) -> syn::Result<Vec<T>> {
    if items.is_empty() {
        return Err(syn::Error::new_spanned(list, "expected at least one field name"));
    }
    Ok(items)
}

/// Attribute key of a declared name, without any `r#` prefix.
fn key(ident: &Ident) -> String {
    ident.unraw().to_string()
}

fn lit(ident: &Ident) -> LitStr {
    LitStr::new(&key(ident), ident.span())
}

/// Replace the first `uri` segment of a `_`-separated name with `url`.
///
/// Must agree with `recordkit::schema::naming::url_companion`, which derives
/// the same alias at runtime; `tests/declared_records.rs` pins both to one
/// set of names.
fn url_companion(name: &str) -> Option<String> {
    let mut segments: Vec<&str> = name.split('_').collect();
    let index = segments.iter().position(|segment| *segment == "uri")?;
    segments[index] = "url";
    Some(segments.join("_"))
}

pub(crate) enum Body {
    Value,
    Flag,
    Uri,
    Object(Type),
}

/// One generated inherent method.
pub(crate) struct Accessor {
    method: Ident,
    /// Reader name passed to `RecordBase`.
    target: Ident,
    body: Body,
}

impl Accessor {
    fn reader(method: &Ident, target: &Ident, body: Body) -> Self {
        Self {
            method: method.clone(),
            target: target.clone(),
            body,
        }
    }

    fn predicate(method: &Ident, target: &Ident) -> Self {
        Self {
            method: format_ident!("has_{}", method),
            target: target.clone(),
            body: Body::Flag,
        }
    }

    pub(crate) fn method(&self) -> TokenStream2 {
        let method = &self.method;
        let target = lit(&self.target);
        match &self.body {
            Body::Value => {
                let doc = format!("Raw `{}` value, `null` when absent.", key(&self.target));
                quote! {
                    #[doc = #doc]
                    #[inline]
                    pub fn #method(&self) -> &::recordkit::Value {
                        self.base.value(#target)
                    }
                }
            }
            Body::Flag => {
                let doc = format!("Whether `{}` is set.", key(&self.target));
                quote! {
                    #[doc = #doc]
                    #[inline]
                    pub fn #method(&self) -> bool {
                        self.base.flag(#target)
                    }
                }
            }
            Body::Uri => {
                let doc = format!("`{}` parsed as a URL, `None` when absent.", key(&self.target));
                quote! {
                    #[doc = #doc]
                    #[inline]
                    pub fn #method(
                        &self,
                    ) -> ::core::result::Result<::core::option::Option<&::recordkit::Url>, ::recordkit::RecordError> {
                        self.base.uri(#target)
                    }
                }
            }
            Body::Object(wrapper) => {
                let doc = format!("`{}` as a nested record, a null object when absent.", key(&self.target));
                quote! {
                    #[doc = #doc]
                    #[inline]
                    pub fn #method(
                        &self,
                    ) -> ::core::result::Result<::recordkit::ObjectRef<'_, #wrapper>, ::recordkit::RecordError> {
                        self.base.object::<#wrapper>(#target)
                    }
                }
            }
        }
    }
}

/// Reject duplicate and reserved method names.
pub(crate) fn check_unique(accessors: &[Accessor]) -> syn::Result<()> {
    let mut seen: Vec<String> = Vec::with_capacity(accessors.len());
    for accessor in accessors {
        let name = key(&accessor.method);
        if RESERVED.contains(&name.as_str()) {
            return Err(syn::Error::new(
                accessor.method.span(),
                format!("`{name}` collides with a generated record method"),
            ));
        }
        if seen.contains(&name) {
            return Err(syn::Error::new(
                accessor.method.span(),
                format!("`{name}` is declared more than once"),
            ));
        }
        seen.push(name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn names(declaration: &Declaration) -> Vec<String> {
        declaration
            .accessors()
            .iter()
            .map(|accessor| key(&accessor.method))
            .collect()
    }

    #[test]
    fn test_attr_reader_methods() {
        let meta: Meta = parse_quote!(attr_reader(id, text));
        let declaration = Declaration::parse(&meta).unwrap();
        assert_eq!(names(&declaration), ["id", "has_id", "text", "has_text"]);
    }

    #[test]
    fn test_uri_reader_methods() {
        let meta: Meta = parse_quote!(uri_attr_reader(media_uri_https));
        let declaration = Declaration::parse(&meta).unwrap();
        assert_eq!(
            names(&declaration),
            ["media_uri_https", "media_url_https", "has_media_uri_https", "has_media_url_https"]
        );
    }

    #[test]
    fn test_uri_reader_requires_segment() {
        let meta: Meta = parse_quote!(uri_attr_reader(security_token));
        assert!(Declaration::parse(&meta).is_err());
    }

    #[test]
    fn test_object_reader_forms() {
        let meta: Meta = parse_quote!(object_attr_reader(User, user));
        assert!(matches!(
            Declaration::parse(&meta).unwrap(),
            Declaration::Object { key2: None, .. }
        ));

        let meta: Meta = parse_quote!(object_attr_reader(crate::Place, place, venue));
        let Declaration::Object { key1, key2, .. } = Declaration::parse(&meta).unwrap() else {
            panic!("expected object declaration");
        };
        assert_eq!(key1, "place");
        assert_eq!(key2.unwrap(), "venue");

        let meta: Meta = parse_quote!(object_attr_reader(User, a, b, c));
        assert!(Declaration::parse(&meta).is_err());
    }

    #[test]
    fn test_display_uri_takes_no_arguments() {
        let meta: Meta = parse_quote!(display_uri_attr_reader);
        let declaration = Declaration::parse(&meta).unwrap();
        assert_eq!(
            names(&declaration),
            ["display_url", "display_uri", "has_display_url", "has_display_uri"]
        );

        let meta: Meta = parse_quote!(display_uri_attr_reader(x));
        assert!(Declaration::parse(&meta).is_err());
    }

    #[test]
    fn test_unknown_form() {
        let meta: Meta = parse_quote!(attr_writer(id));
        assert!(Declaration::parse(&meta).is_err());
    }

    #[test]
    fn test_check_unique_rejects_duplicates_and_reserved() {
        let plain: Meta = parse_quote!(attr_reader(display_url));
        let display: Meta = parse_quote!(display_uri_attr_reader);
        let accessors: Vec<Accessor> = [plain, display]
            .iter()
            .flat_map(|meta| Declaration::parse(meta).unwrap().accessors())
            .collect();
        assert!(check_unique(&accessors).is_err());

        let reserved: Meta = parse_quote!(attr_reader(to_h));
        let accessors = Declaration::parse(&reserved).unwrap().accessors();
        assert!(check_unique(&accessors).is_err());

        let fine: Meta = parse_quote!(attr_reader(id, text));
        assert!(check_unique(&Declaration::parse(&fine).unwrap().accessors()).is_ok());
    }

    #[test]
    fn test_raw_identifiers_use_bare_keys() {
        let meta: Meta = parse_quote!(attr_reader(id, r#type));
        let declaration = Declaration::parse(&meta).unwrap();

        assert_eq!(names(&declaration), ["id", "has_id", "type", "has_type"]);
        let call = declaration.builder_call().to_string();
        assert!(call.contains("\"type\""), "{call}");
        assert!(!call.contains("r#type"), "{call}");
    }

    #[test]
    fn test_predicate_named_field_collides() {
        let meta: Meta = parse_quote!(attr_reader(id, has_id));
        let accessors = Declaration::parse(&meta).unwrap().accessors();
        assert!(check_unique(&accessors).is_err());
    }

    #[test]
    fn test_url_companion() {
        assert_eq!(url_companion("uri").as_deref(), Some("url"));
        assert_eq!(url_companion("uri_to_uri").as_deref(), Some("url_to_uri"));
        assert_eq!(url_companion("security"), None);
    }
}
