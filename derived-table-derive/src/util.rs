use std::borrow::Cow;

use convert_case::{Case, Casing};
use darling::FromMeta;
use proc_macro2::{Ident, Span, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;
use syn::{parse_quote, punctuated::Punctuated, Attribute, Meta, Token};

#[derive(Clone, Copy, Debug, FromMeta)]
pub enum RenameAll {
    #[darling(rename = "lowercase")]
    Lower,
    #[darling(rename = "UPPERCASE")]
    Upper,
    #[darling(rename = "PascalCase")]
    Pascal,
    #[darling(rename = "camelCase")]
    Camel,
    #[darling(rename = "snake_case")]
    Snake,
    #[darling(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnake,
    #[darling(rename = "kebab-case")]
    Kebab,
    #[darling(rename = "SCREAMING-KEBAB-CASE")]
    ScreamingKebab,
}

impl RenameAll {
    /// apply the case convention to a `snake_case` field name, the way serde does
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameAll::Lower | RenameAll::Snake => field.to_string(),
            RenameAll::Upper | RenameAll::ScreamingSnake => field.to_uppercase(),
            RenameAll::Pascal => field.from_case(Case::Snake).to_case(Case::Pascal),
            RenameAll::Camel => field.from_case(Case::Snake).to_case(Case::Camel),
            RenameAll::Kebab => field.replace('_', "-"),
            RenameAll::ScreamingKebab => field.replace('_', "-").to_uppercase(),
        }
    }
}

pub fn found_crate() -> TokenStream {
    let found_crate =
        crate_name("derived-table").expect("derived-table is present in `Cargo.toml`");
    match found_crate {
        FoundCrate::Itself => quote!(derived_table),
        FoundCrate::Name(name) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!( ::#ident )
        }
    }
}

pub fn renamed_name<'a>(
    s: String,
    rename: Option<impl Into<Cow<'a, str>>>,
    rename_all: Option<RenameAll>,
) -> Cow<'a, str> {
    rename.map(Into::into).unwrap_or_else(|| match rename_all {
        Some(case) => case.apply(&s).into(),
        None => s.into(),
    })
}

/// Strip every option except `keys` from `#[serde(...)]` attributes, so that serde options
/// unknown to us don't fail parsing.
///
/// List forms like `rename(serialize = "a", deserialize = "b")` are reduced to their
/// `serialize` value, rows only ever see serialized names.
pub fn filter_serde_attrs(attrs: &[Attribute], keys: &[&str]) -> syn::Result<Vec<Attribute>> {
    let mut out = Vec::new();
    for a in attrs {
        if !a.path().is_ident("serde") {
            out.push(a.clone());
            continue;
        }
        let metas = a.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        let mut kept = Vec::new();
        for m in metas {
            if !keys.iter().any(|k| m.path().is_ident(k)) {
                continue;
            }
            if let Some(m) = serialize_form(m)? {
                kept.push(m);
            }
        }
        if !kept.is_empty() {
            out.push(parse_quote!(#[serde(#(#kept),*)]));
        }
    }
    Ok(out)
}

fn serialize_form(meta: Meta) -> syn::Result<Option<Meta>> {
    let list = match meta {
        Meta::List(list) => list,
        m => return Ok(Some(m)),
    };
    let path = &list.path;
    let nested = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
    Ok(nested.into_iter().find_map(|m| match m {
        Meta::NameValue(nv) if nv.path.is_ident("serialize") => {
            let value = nv.value;
            Some(parse_quote!(#path = #value))
        }
        _ => None,
    }))
}
