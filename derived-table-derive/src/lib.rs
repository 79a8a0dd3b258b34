use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput};

mod row;
mod util;

/// Implement `Row` by looking up the fields of a struct by name.
///
/// Field values are converted with `serde_json::to_value`. Supported options:
/// `#[table(skip)]` and `#[table(rename = "...")]` on fields, `#[table(rename_all = "...")]` on the
/// struct. `rename`, `rename_all`, `skip` and `skip_serializing` are also read from
/// `#[serde(...)]`, so attribute names match the serialized keys.
#[proc_macro_derive(Row, attributes(table))]
pub fn derive_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match &input.data {
        Data::Struct(data) => {
            row::derive_struct(&input, data).unwrap_or_else(syn::Error::into_compile_error)
        }
        _ => quote!(compile_error!("`Row` can only be derived for `struct`s")),
    }
    .into()
}
