//! OpenAPI document structure definitions

use crate::route::PathItem;
use crate::schema::{Components, ExternalDocumentation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Security requirement: scheme name -> required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// OpenAPI document version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OpenApiVersion {
    #[serde(rename = "3.0.3")]
    V3_0_3,
    #[serde(rename = "3.1.0")]
    #[default]
    V3_1_0,
    #[serde(rename = "3.1.1")]
    V3_1_1,
}

impl OpenApiVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3_0_3 => "3.0.3",
            Self::V3_1_0 => "3.1.0",
            Self::V3_1_1 => "3.1.1",
        }
    }
}

impl TryFrom<&str> for OpenApiVersion {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "3.0.3" => Ok(Self::V3_0_3),
            "3.1.0" => Ok(Self::V3_1_0),
            "3.1.1" => Ok(Self::V3_1_1),
            other => Err(format!("unsupported OpenAPI version: {other}")),
        }
    }
}

/// Contact information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Contact name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// License information
///
/// `identifier` (an SPDX expression) and `url` are mutually exclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// License name
    pub name: String,
    /// SPDX license identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// License URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terms of service URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    /// Contact information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// License information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// Summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Server variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerVariable {
    /// Default value
    pub default: String,
    /// Enum values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<String>>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server URL
    pub url: String,
    /// Server description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server variables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, ServerVariable>>,
}

/// Tag definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag name
    pub name: String,
    /// Tag description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// External documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
}

/// OpenAPI document (root structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApi {
    /// OpenAPI version
    pub openapi: OpenApiVersion,
    /// API information
    pub info: Info,
    /// Server list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Path definitions
    pub paths: BTreeMap<String, PathItem>,
    /// Components (reusable components)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Security requirements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Tag definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// External documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
}

impl OpenApi {
    /// Empty document with the given title and version.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Info {
                title: title.into(),
                version: version.into(),
                ..Info::default()
            },
            ..Self::default()
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Merge another OpenAPI document into this one.
    /// Paths, schemas, security schemes and tags from `other` are added to `self`.
    /// If there are conflicts, `self` takes precedence.
    pub fn merge(&mut self, other: Self) {
        for (path, item) in other.paths {
            self.paths.entry(path).or_insert(item);
        }

        if let Some(other_components) = other.components {
            let self_components = self.components.get_or_insert_with(Components::default);

            if let Some(other_schemas) = other_components.schemas {
                let self_schemas = self_components.schemas.get_or_insert_with(BTreeMap::new);
                for (name, schema) in other_schemas {
                    self_schemas.entry(name).or_insert(schema);
                }
            }

            if let Some(other_security_schemes) = other_components.security_schemes {
                let self_security_schemes = self_components
                    .security_schemes
                    .get_or_insert_with(BTreeMap::new);
                for (name, scheme) in other_security_schemes {
                    self_security_schemes.entry(name).or_insert(scheme);
                }
            }
        }

        // Deduplicate by name
        if let Some(other_tags) = other.tags {
            let self_tags = self.tags.get_or_insert_with(Vec::new);
            for tag in other_tags {
                if !self_tags.iter().any(|t| t.name == tag.name) {
                    self_tags.push(tag);
                }
            }
        }
    }

    /// Merge from a JSON string. Returns error if parsing fails.
    pub fn merge_from_str(&mut self, json_str: &str) -> Result<(), serde_json::Error> {
        let other: Self = serde_json::from_str(json_str)?;
        self.merge(other);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use rstest::rstest;

    fn doc_with_schema(name: &str, schema: Schema) -> OpenApi {
        let mut doc = OpenApi::new("t", "1");
        doc.components = Some(Components {
            schemas: Some(BTreeMap::from([(name.to_string(), schema)])),
            ..Components::default()
        });
        doc
    }

    #[test]
    fn new_document_defaults_to_3_1() {
        let json = OpenApi::new("Pets", "1.0.0").to_json().unwrap();
        assert_eq!(
            json,
            r#"{"openapi":"3.1.0","info":{"title":"Pets","version":"1.0.0"},"paths":{}}"#
        );
    }

    #[rstest]
    #[case("3.0.3", OpenApiVersion::V3_0_3)]
    #[case("3.1.0", OpenApiVersion::V3_1_0)]
    #[case(" 3.1.1 ", OpenApiVersion::V3_1_1)]
    fn version_parses(#[case] input: &str, #[case] expected: OpenApiVersion) {
        assert_eq!(OpenApiVersion::try_from(input).unwrap(), expected);
        assert_eq!(expected.as_str(), input.trim());
    }

    #[test]
    fn version_rejects_unknown() {
        assert!(OpenApiVersion::try_from("2.0").is_err());
    }

    #[test]
    fn merge_keeps_existing_schema_on_conflict() {
        let mut base = doc_with_schema("User", Schema::string());
        let other = doc_with_schema("User", Schema::integer());
        base.merge(other);

        let schemas = base.components.unwrap().schemas.unwrap();
        assert_eq!(schemas["User"], Schema::string());
    }

    #[test]
    fn merge_adds_new_schemas_and_tags() {
        let mut base = OpenApi::new("t", "1");
        let mut other = doc_with_schema("Order", Schema::object());
        other.tags = Some(vec![Tag {
            name: "orders".into(),
            description: None,
            external_docs: None,
        }]);
        base.merge(other.clone());
        base.merge(other);

        assert!(base.components.unwrap().schemas.unwrap().contains_key("Order"));
        assert_eq!(base.tags.unwrap().len(), 1);
    }

    #[test]
    fn merge_from_str_reports_parse_errors() {
        let mut base = OpenApi::new("t", "1");
        assert!(base.merge_from_str("{not json").is_err());
        let other = r#"{"openapi":"3.1.0","info":{"title":"x","version":"2"},"paths":{"/a":{}}}"#;
        base.merge_from_str(other).unwrap();
        assert!(base.paths.contains_key("/a"));
        assert_eq!(base.info.title, "t");
    }
}
