use darling::{FromAttributes, FromField};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{ext::IdentExt, DataStruct, DeriveInput, Field, Fields};

use crate::util::{filter_serde_attrs, found_crate, renamed_name, RenameAll};

#[derive(Debug, FromAttributes)]
#[darling(attributes(table))]
struct RowStructOptions {
    rename_all: Option<RenameAll>,
}

/// the subset of serde's container options that changes attribute names
#[derive(Debug, FromAttributes)]
#[darling(attributes(serde))]
struct SerdeStructOptions {
    rename_all: Option<RenameAll>,
}

#[derive(Debug, FromField)]
#[darling(attributes(table))]
struct RowFieldOptions {
    ident: Option<Ident>,
    /// Do not expose this field as attribute
    #[darling(default)]
    skip: bool,
    rename: Option<String>,
}

/// the subset of serde's field options that changes attribute names or hides fields
#[derive(Debug, FromAttributes)]
#[darling(attributes(serde))]
struct SerdeFieldOptions {
    #[darling(default)]
    skip: bool,
    #[darling(default)]
    skip_serializing: bool,
    rename: Option<String>,
}

impl RowFieldOptions {
    /// `#[table(...)]` options take precedence over `#[serde(...)]`
    fn parse(f: &Field) -> syn::Result<Self> {
        let mut options = Self::from_field(f)?;
        let serde = SerdeFieldOptions::from_attributes(&filter_serde_attrs(
            &f.attrs,
            &["rename", "skip", "skip_serializing"],
        )?)?;
        options.skip |= serde.skip || serde.skip_serializing;
        options.rename = options.rename.or(serde.rename);
        Ok(options)
    }
}

pub fn derive_struct(input: &DeriveInput, data: &DataStruct) -> syn::Result<TokenStream> {
    let found_crate = found_crate();

    if !matches!(data.fields, Fields::Named(_)) {
        return Ok(quote!(compile_error!(
            "`Row` can only be derived for `struct`s with named fields"
        )));
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let serde_attrs = filter_serde_attrs(&input.attrs, &["rename_all"])?;
    let rename_all = RowStructOptions::from_attributes(&input.attrs)?
        .rename_all
        .or(SerdeStructOptions::from_attributes(&serde_attrs)?.rename_all);

    let fields = data
        .fields
        .iter()
        .map(RowFieldOptions::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let arms = fields
        .iter()
        .filter(|f| !f.skip)
        .filter_map(|f| {
            let ident = f.ident.as_ref()?;
            let name = renamed_name(ident.unraw().to_string(), f.rename.as_ref(), rename_all);
            Some(quote! {
                #name => #found_crate::derive::serde_json::to_value(&self.#ident).ok(),
            })
        })
        .collect::<TokenStream>();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #found_crate::Row for #ident #ty_generics #where_clause {
            fn attr(
                &self,
                name: &::std::primitive::str,
            ) -> ::std::option::Option<#found_crate::derive::serde_json::Value> {
                match name {
                    #arms
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}
