//! Scalar API reference page.

use apiforge_core::openapi::OpenApi;
use serde_json::Value;

/// CDN bundle of the Scalar API reference viewer.
pub const SCALAR_CDN: &str = "https://cdn.jsdelivr.net/npm/@scalar/api-reference";

/// Render a standalone HTML page showing `openapi` with Scalar.
///
/// `configuration` is passed to Scalar as-is, e.g. `{"theme": "purple"}`.
pub fn scalar_html(openapi: &OpenApi, configuration: &Value) -> Result<String, serde_json::Error> {
    let spec = script_safe(&openapi.to_json()?);
    let config = script_safe(&serde_json::to_string(configuration)?);
    Ok(format!(
        r#"<!doctype html><html><head><title>API Reference</title><meta charset="utf-8" /><meta name="viewport" content="width=device-width, initial-scale=1" /></head><body><script id="api-reference" type="application/json">{spec}</script><script>var configuration = {config};document.getElementById("api-reference").dataset.configuration = JSON.stringify(configuration);</script><script src="{SCALAR_CDN}"></script></body></html>"#
    ))
}

/// JSON may contain `</script>` inside strings; `<\/` is the same string to
/// a JSON parser but cannot close the element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn embeds_spec_and_configuration() {
        let doc = OpenApi::new("Pets", "1.0.0");
        let html = scalar_html(&doc, &json!({"theme": "purple"})).unwrap();

        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains(r#"<script id="api-reference" type="application/json">{"openapi":"3.1.0""#));
        assert!(html.contains(r#"var configuration = {"theme":"purple"};"#));
        assert!(html.contains(SCALAR_CDN));
    }

    #[test]
    fn closing_tags_in_strings_are_escaped() {
        let mut doc = OpenApi::new("Pets", "1.0.0");
        doc.info.description = Some("</script><script>alert(1)</script>".to_string());
        let html = scalar_html(&doc, &Value::Null).unwrap();

        assert_eq!(html.matches("</script>").count(), 3);
        assert!(html.contains(r"<\/script><script>alert(1)<\/script>"));
    }
}
