mod describe_impl;
mod serde_attrs;

use proc_macro::TokenStream;

/// Derive macro for `apiforge::Describe`
///
/// Supports structs with named fields (and unit structs). Field metadata is
/// given with `#[schema(...)]`; serde's `rename`, `rename_all`, `skip` and
/// `skip_serializing_if` are honored so the schema matches the serialized form.
///
/// ```ignore
/// #[derive(Describe)]
/// #[serde(rename_all = "camelCase")]
/// struct User {
///     #[schema(minimum = 1, readOnly)]
///     user_id: u64,
///     /// Display name
///     #[schema(min_length = 1, max_length = 64)]
///     name: String,
/// }
/// ```
#[proc_macro_derive(Describe, attributes(schema))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    describe_impl::expand_describe(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
