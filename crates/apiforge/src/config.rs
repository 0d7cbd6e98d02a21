//! Document defaults, optionally taken from `APIFORGE_*` environment variables.

use apiforge_core::openapi::{OpenApiVersion, Server};
use apiforge_core::schema::COMPONENTS_SCHEMAS_PREFIX;
use tracing::warn;

/// Content type used by request and response bodies unless overridden.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub openapi_version: OpenApiVersion,
    /// Prefix of schema references
    pub schema_prefix: String,
    pub content_type: String,
    pub servers: Vec<Server>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            openapi_version: OpenApiVersion::default(),
            schema_prefix: COMPONENTS_SCHEMAS_PREFIX.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            servers: Vec::new(),
        }
    }
}

impl Config {
    /// Read the process environment.
    ///
    /// `APIFORGE_VERSION` falls back to `CARGO_PKG_VERSION`;
    /// `APIFORGE_SERVER_URL` is ignored unless it is an http(s) URL.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let openapi_version = lookup("APIFORGE_OPENAPI_VERSION")
            .and_then(|raw| match OpenApiVersion::try_from(raw.as_str()) {
                Ok(version) => Some(version),
                Err(_) => {
                    warn!(value = %raw, "ignoring unsupported APIFORGE_OPENAPI_VERSION");
                    None
                }
            })
            .unwrap_or(defaults.openapi_version);

        let servers = lookup("APIFORGE_SERVER_URL")
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
            .map(|url| {
                vec![Server {
                    url,
                    description: lookup("APIFORGE_SERVER_DESCRIPTION"),
                    variables: None,
                }]
            })
            .unwrap_or_default();

        Self {
            title: lookup("APIFORGE_TITLE").unwrap_or(defaults.title),
            version: lookup("APIFORGE_VERSION")
                .or_else(|| lookup("CARGO_PKG_VERSION"))
                .unwrap_or(defaults.version),
            description: lookup("APIFORGE_DESCRIPTION"),
            openapi_version,
            schema_prefix: lookup("APIFORGE_SCHEMA_PREFIX").unwrap_or(defaults.schema_prefix),
            content_type: lookup("APIFORGE_CONTENT_TYPE").unwrap_or(defaults.content_type),
            servers,
        }
    }
}
