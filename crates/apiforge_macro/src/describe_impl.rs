//! `#[derive(Describe)]` implementation.
//!
//! The derive turns a struct with named fields into an `apiforge::Describe`
//! impl whose descriptor lists every field with its metadata tags. Nothing is
//! resolved at compile time; nested types are referenced through their own
//! `Describe::descriptor` function pointers.
//!
//! # Custom Schema Names
//!
//! By default, the schema name matches the struct name. Generic structs append
//! the names of their type arguments (`Page<User>` becomes `PageUser`).
//!
//! ```ignore
//! #[derive(Describe)]
//! #[schema(name = "CustomSchemaName")]
//! pub struct MyType { ... }
//! ```
//!
//! # Field Tags
//!
//! `#[schema(key = value, flag)]` on a field becomes a list of string tags.
//! Literal values are stringified, bare flags become `"true"`, and snake_case
//! keys are accepted as aliases of the camelCase tag names
//! (`min_length` is `minLength`). Doc comments become the `doc` tag.

use proc_macro2::TokenStream;
use quote::quote;

use crate::serde_attrs::{
    extract_doc_comment, extract_field_rename, extract_rename_all, extract_skip,
    extract_skip_serializing_if, rename_field, strip_raw_prefix,
};

/// Extract custom schema name from #[schema(name = "...")] attribute
pub fn extract_schema_name_attr(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut custom_name = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("schema")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                custom_name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported container attribute, expected `name`"))
            }
        })?;
    }
    Ok(custom_name)
}

fn literal_to_string(lit: &syn::Lit) -> syn::Result<String> {
    match lit {
        syn::Lit::Str(s) => Ok(s.value()),
        syn::Lit::Int(i) => Ok(i.base10_digits().to_string()),
        syn::Lit::Float(f) => Ok(f.base10_digits().to_string()),
        syn::Lit::Bool(b) => Ok(b.value.to_string()),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string, number or boolean literal",
        )),
    }
}

fn expr_to_string(expr: &syn::Expr) -> syn::Result<String> {
    match expr {
        syn::Expr::Lit(syn::ExprLit { lit, .. }) => literal_to_string(lit),
        syn::Expr::Unary(syn::ExprUnary {
            op: syn::UnOp::Neg(_),
            expr,
            ..
        }) => Ok(format!("-{}", expr_to_string(expr)?)),
        syn::Expr::Group(group) => expr_to_string(&group.expr),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string, number or boolean literal",
        )),
    }
}

/// Tag key as written, with snake_case spellings mapped to camelCase.
fn tag_key(path: &syn::Path) -> syn::Result<String> {
    let ident = path
        .get_ident()
        .ok_or_else(|| syn::Error::new_spanned(path, "expected a single identifier"))?;
    let key = ident.to_string();
    let key = strip_raw_prefix(&key);
    if key.contains('_') {
        Ok(rename_field(key, Some("camelCase")))
    } else {
        Ok(key.to_string())
    }
}

/// Collect `#[schema(...)]` field tags in declaration order.
pub fn extract_field_tags(attrs: &[syn::Attribute]) -> syn::Result<Vec<(String, String)>> {
    let mut tags = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("schema")) {
        attr.parse_nested_meta(|meta| {
            let key = tag_key(&meta.path)?;
            let value = if meta.input.peek(syn::Token![=]) {
                let expr: syn::Expr = meta.value()?.parse()?;
                expr_to_string(&expr)?
            } else {
                "true".to_string()
            };
            tags.push((key, value));
            Ok(())
        })?;
    }
    Ok(tags)
}

/// Build the `json` tag value from serde attributes, if any apply.
fn serde_json_tag(
    field: &syn::Field,
    declared: &str,
    rename_all: Option<&str>,
) -> syn::Result<Option<String>> {
    let name = match extract_field_rename(&field.attrs)? {
        Some(renamed) => renamed,
        None => rename_field(declared, rename_all),
    };
    let omit_empty = extract_skip_serializing_if(&field.attrs)?;
    if name == declared && !omit_empty {
        return Ok(None);
    }
    Ok(Some(if omit_empty {
        format!("{name},omitempty")
    } else {
        name
    }))
}

fn field_tokens(field: &syn::Field, rename_all: Option<&str>) -> syn::Result<TokenStream> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let declared = ident.to_string();
    let declared = strip_raw_prefix(&declared).to_string();
    let ty = &field.ty;

    let mut tags = extract_field_tags(&field.attrs)?;
    if !tags.iter().any(|(key, _)| key == "json")
        && let Some(json) = serde_json_tag(field, &declared, rename_all)?
    {
        tags.insert(0, ("json".to_string(), json));
    }
    if !tags.iter().any(|(key, _)| key == "doc")
        && let Some(doc) = extract_doc_comment(&field.attrs)
    {
        tags.push(("doc".to_string(), doc));
    }

    let with_tags = tags.iter().map(|(key, value)| quote!(.with_tag(#key, #value)));
    Ok(quote! {
        ::apiforge::FieldDef::new::<#ty>(#declared) #(#with_tags)*
    })
}

/// Expand a derive input into a `Describe` impl.
pub fn expand_describe(input: &syn::DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;

    let fields: Vec<&syn::Field> = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => named.named.iter().collect(),
            syn::Fields::Unit => Vec::new(),
            syn::Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Describe cannot be derived for tuple structs",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Describe can only be derived for structs",
            ));
        }
    };

    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Describe requires 'static types; remove the lifetime parameter",
        ));
    }

    let base_name = extract_schema_name_attr(&input.attrs)?.unwrap_or_else(|| ident.to_string());
    let rename_all = extract_rename_all(&input.attrs)?;

    let type_params: Vec<&syn::Ident> = input.generics.type_params().map(|p| &p.ident).collect();
    let name_expr = if type_params.is_empty() {
        quote!(#base_name)
    } else {
        quote! {
            ::apiforge::describe::compose_name(
                #base_name,
                &[#(<#type_params as ::apiforge::Describe>::descriptor()),*],
            )
        }
    };

    let mut generics = input.generics.clone();
    if !type_params.is_empty() {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(syn::parse_quote!(#param: ::apiforge::Describe));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut field_defs = Vec::with_capacity(fields.len());
    for field in &fields {
        // Serde-skipped fields are left out, so their types need not implement Describe
        if extract_skip(&field.attrs)? {
            continue;
        }
        field_defs.push(field_tokens(field, rename_all.as_deref())?);
    }

    let with_doc = extract_doc_comment(&input.attrs).map(|doc| quote!(.with_doc(#doc)));

    Ok(quote! {
        impl #impl_generics ::apiforge::Describe for #ident #ty_generics #where_clause {
            fn descriptor() -> ::apiforge::Descriptor {
                ::apiforge::Descriptor::structure::<Self>(
                    #name_expr,
                    ::std::vec![#(#field_defs),*],
                ) #with_doc
            }
        }
    })
}
