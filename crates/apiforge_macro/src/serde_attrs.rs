//! Serde attribute extraction.
//!
//! A derived descriptor must name fields the way serde serializes them, so the
//! container's `rename_all` and each field's `rename` / `skip` /
//! `skip_serializing_if` are read here and folded into the field's `json` tag.

use syn::meta::ParseNestedMeta;

/// Extract doc comments from attributes.
/// Returns concatenated doc comment string or None if no doc comments.
pub fn extract_doc_comment(attrs: &[syn::Attribute]) -> Option<String> {
    let doc_lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit_str),
                        ..
                    }),
                ..
            }) => {
                let line = lit_str.value();
                // rustdoc keeps the space after `///`
                Some(line.strip_prefix(' ').unwrap_or(&line).to_string())
            }
            _ => None,
        })
        .collect();

    if doc_lines.is_empty() {
        None
    } else {
        Some(doc_lines.join("\n").trim().to_string())
    }
}

/// Strips the `r#` prefix from raw identifiers.
/// E.g., `r#type` becomes `type`.
pub fn strip_raw_prefix(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// Consume the value of a nested meta item we do not care about.
pub fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta_value(&inner))?;
    }
    Ok(())
}

fn parse_str_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: syn::LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Walk every `#[serde(...)]` item, handing each nested meta to `visit`.
/// `visit` returns `Ok(true)` when it consumed the item's value.
fn visit_serde_meta(
    attrs: &[syn::Attribute],
    mut visit: impl FnMut(&ParseNestedMeta) -> syn::Result<bool>,
) -> syn::Result<()> {
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if !visit(&meta)? {
                skip_meta_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

/// `#[serde(rename_all = "...")]` on the container.
pub fn extract_rename_all(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut found = None;
    visit_serde_meta(attrs, |meta| {
        if meta.path.is_ident("rename_all") {
            if meta.input.peek(syn::Token![=]) {
                found = Some(parse_str_value(meta)?);
            } else {
                meta.parse_nested_meta(|inner| {
                    if inner.path.is_ident("serialize") {
                        found = Some(parse_str_value(&inner)?);
                    } else {
                        skip_meta_value(&inner)?;
                    }
                    Ok(())
                })?;
            }
            return Ok(true);
        }
        Ok(false)
    })?;
    Ok(found)
}

/// `#[serde(rename = "...")]` or `#[serde(rename(serialize = "..."))]` on a field.
pub fn extract_field_rename(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut found = None;
    visit_serde_meta(attrs, |meta| {
        if meta.path.is_ident("rename") {
            if meta.input.peek(syn::Token![=]) {
                found = Some(parse_str_value(meta)?);
            } else {
                meta.parse_nested_meta(|inner| {
                    if inner.path.is_ident("serialize") {
                        found = Some(parse_str_value(&inner)?);
                    } else {
                        skip_meta_value(&inner)?;
                    }
                    Ok(())
                })?;
            }
            return Ok(true);
        }
        Ok(false)
    })?;
    Ok(found)
}

/// True when the field never appears in serialized output
/// (`#[serde(skip)]` or `#[serde(skip_serializing)]`).
pub fn extract_skip(attrs: &[syn::Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    visit_serde_meta(attrs, |meta| {
        if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
            skip = true;
        }
        Ok(false)
    })?;
    Ok(skip)
}

/// True when `#[serde(skip_serializing_if = "...")]` is present.
pub fn extract_skip_serializing_if(attrs: &[syn::Attribute]) -> syn::Result<bool> {
    let mut found = false;
    visit_serde_meta(attrs, |meta| {
        if meta.path.is_ident("skip_serializing_if") {
            found = true;
        }
        Ok(false)
    })?;
    Ok(found)
}

/// Split an identifier into words on `_`, `-` and case boundaries.
/// `XMLParser` splits into `XML` and `Parser`.
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Apply a serde `rename_all` convention to a field name.
pub fn rename_field(field_name: &str, rename_all: Option<&str>) -> String {
    let words = || split_words(field_name);
    match rename_all {
        Some("camelCase") => words()
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
            .collect(),
        Some("PascalCase") => words().iter().map(|w| capitalize(w)).collect(),
        Some("snake_case") => join_words(&words(), "_", false),
        Some("SCREAMING_SNAKE_CASE") => join_words(&words(), "_", true),
        Some("kebab-case") => join_words(&words(), "-", false),
        Some("SCREAMING-KEBAB-CASE") => join_words(&words(), "-", true),
        Some("lowercase") => field_name.to_lowercase(),
        Some("UPPERCASE") => field_name.to_uppercase(),
        _ => field_name.to_string(),
    }
}

fn join_words(words: &[String], separator: &str, upper: bool) -> String {
    words
        .iter()
        .map(|w| if upper { w.to_uppercase() } else { w.to_lowercase() })
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn field_attrs(field_src: &str) -> Vec<syn::Attribute> {
        let item: syn::ItemStruct =
            syn::parse_str(&format!("struct Foo {{ {field_src} }}")).unwrap();
        match item.fields {
            syn::Fields::Named(fields) => fields.named.into_iter().next().unwrap().attrs,
            _ => unreachable!(),
        }
    }

    #[rstest]
    #[case("user_name", Some("camelCase"), "userName")]
    #[case("api_key", Some("camelCase"), "apiKey")]
    #[case("UserName", Some("camelCase"), "userName")]
    #[case("ID", Some("camelCase"), "id")]
    #[case("XMLParser", Some("camelCase"), "xmlParser")]
    #[case("HTTPSConnection", Some("camelCase"), "httpsConnection")]
    #[case("userName", Some("snake_case"), "user_name")]
    #[case("already_snake", Some("snake_case"), "already_snake")]
    #[case("user_id", Some("kebab-case"), "user-id")]
    #[case("user_name", Some("PascalCase"), "UserName")]
    #[case("AlreadyPascal", Some("PascalCase"), "AlreadyPascal")]
    #[case("FIRST_NAME", Some("lowercase"), "first_name")]
    #[case("firstName", Some("UPPERCASE"), "FIRSTNAME")]
    #[case("firstName", Some("SCREAMING_SNAKE_CASE"), "FIRST_NAME")]
    #[case("ALREADY_SCREAMING", Some("SCREAMING_SNAKE_CASE"), "ALREADY_SCREAMING")]
    #[case("LastName", Some("SCREAMING-KEBAB-CASE"), "LAST-NAME")]
    #[case("user-id", None, "user-id")]
    #[case("field_2fa", Some("camelCase"), "field2fa")]
    fn test_rename_field(
        #[case] field_name: &str,
        #[case] rename_all: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(rename_field(field_name, rename_all), expected);
    }

    #[rstest]
    #[case(r#"#[serde(rename_all = "camelCase")] struct Foo;"#, Some("camelCase"))]
    #[case(r#"#[serde(rename_all = "camelCase", default)] struct Foo;"#, Some("camelCase"))]
    #[case(r#"#[serde(default, rename_all = "snake_case")] struct Foo;"#, Some("snake_case"))]
    #[case(r#"#[serde(rename_all(serialize = "kebab-case"))] struct Foo;"#, Some("kebab-case"))]
    #[case(r#"#[serde(deny_unknown_fields)] struct Foo;"#, None)]
    #[case(r#"#[derive(Debug)] struct Foo;"#, None)]
    fn test_extract_rename_all(#[case] item_src: &str, #[case] expected: Option<&str>) {
        let item: syn::ItemStruct = syn::parse_str(item_src).unwrap();
        let result = extract_rename_all(&item.attrs).unwrap();
        assert_eq!(result.as_deref(), expected);
    }

    #[rstest]
    #[case(r#"#[serde(rename = "userId")] field: i32"#, Some("userId"))]
    #[case(r#"#[serde(rename = "custom", default)] field: i32"#, Some("custom"))]
    #[case(r#"#[serde(default, rename = "my_field")] field: i32"#, Some("my_field"))]
    #[case(r#"#[serde(rename(serialize = "out", deserialize = "in"))] field: i32"#, Some("out"))]
    #[case(r#"#[serde(rename_all = "camelCase")] field: i32"#, None)]
    #[case(r#"#[serde(skip_serializing_if = "Option::is_none")] field: i32"#, None)]
    #[case(r#"field: i32"#, None)]
    fn test_extract_field_rename(#[case] field_src: &str, #[case] expected: Option<&str>) {
        let result = extract_field_rename(&field_attrs(field_src)).unwrap();
        assert_eq!(result.as_deref(), expected, "Failed for: {field_src}");
    }

    #[rstest]
    #[case(r#"#[serde(skip)] field: i32"#, true)]
    #[case(r#"#[serde(default, skip)] field: i32"#, true)]
    #[case(r#"#[serde(skip_serializing)] field: i32"#, true)]
    #[case(r#"#[serde(skip_deserializing)] field: i32"#, false)]
    #[case(r#"#[serde(skip_serializing_if = "Option::is_none")] field: i32"#, false)]
    #[case(r#"field: i32"#, false)]
    fn test_extract_skip(#[case] field_src: &str, #[case] expected: bool) {
        assert_eq!(
            extract_skip(&field_attrs(field_src)).unwrap(),
            expected,
            "Failed for: {field_src}"
        );
    }

    #[rstest]
    #[case(r#"#[serde(skip_serializing_if = "Vec::is_empty")] field: i32"#, true)]
    #[case(r#"#[serde(default)] field: i32"#, false)]
    #[case(r#"#[serde(skip)] field: i32"#, false)]
    fn test_extract_skip_serializing_if(#[case] field_src: &str, #[case] expected: bool) {
        assert_eq!(extract_skip_serializing_if(&field_attrs(field_src)).unwrap(), expected);
    }

    #[test]
    fn test_extract_doc_comment_joins_lines() {
        let attrs = field_attrs("/// First line\n/// second line\nfield: i32");
        assert_eq!(
            extract_doc_comment(&attrs).as_deref(),
            Some("First line\nsecond line")
        );
        assert!(extract_doc_comment(&field_attrs("field: i32")).is_none());
    }

    #[test]
    fn test_malformed_serde_attribute_is_an_error() {
        let attrs = field_attrs(r#"#[serde(rename = 5)] field: i32"#);
        assert!(extract_field_rename(&attrs).is_err());
    }
}
