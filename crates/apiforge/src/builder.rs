//! Fluent assembly of an OpenAPI document.
//!
//! Schemas for bodies, parameters and headers are resolved through the
//! builder's [`Registry`], so every struct ends up once under
//! `components.schemas` and is referenced everywhere else.
//!
//! ```
//! use apiforge::{Builder, Describe};
//! use apiforge::route::HttpMethod;
//!
//! #[derive(Describe)]
//! struct Pet {
//!     id: u64,
//!     name: String,
//! }
//!
//! # fn main() -> Result<(), apiforge::BuildError> {
//! let mut builder = Builder::new("Pet Store", "1.0.0");
//! builder
//!     .register(HttpMethod::Get, "/pets/{id}")?
//!     .operation_id("getPet")
//!     .request()
//!     .path_param::<u64>("id")?;
//! builder
//!     .register(HttpMethod::Post, "/pets")?
//!     .response(201)
//!     .body::<Pet>()?;
//!
//! let doc = builder.document();
//! assert!(doc.components.unwrap().schemas.unwrap().contains_key("Pet"));
//! # Ok(())
//! # }
//! ```

mod operation;
mod parts;

use std::collections::BTreeMap;

use apiforge_core::openapi::{Contact, License, OpenApi, SecurityRequirement, Server};
use apiforge_core::route::{HttpMethod, Operation};
use apiforge_core::schema::{Components, OAuthFlows, SecurityScheme, SecuritySchemeType};
use tracing::debug;

pub use operation::{
    HeaderBuilder, LinkBuilder, MediaTypeBuilder, OperationBuilder, ParamBuilder,
    RequestBodyBuilder, RequestBuilder, ResponseBuilder,
};
pub use parts::{
    ContactBuilder, ExampleBuilder, LicenseBuilder, OAuth2Builder, OAuthFlowBuilder,
    ServerBuilder, ServerVariableBuilder,
};

use crate::config::Config;
use crate::error::BuildError;
use crate::registry::Registry;

/// Method order used when searching operations.
const SEARCH_ORDER: [HttpMethod; 8] = [
    HttpMethod::Get,
    HttpMethod::Put,
    HttpMethod::Post,
    HttpMethod::Delete,
    HttpMethod::Options,
    HttpMethod::Head,
    HttpMethod::Patch,
    HttpMethod::Trace,
];

#[derive(Debug)]
pub struct Builder {
    doc: OpenApi,
    registry: Registry,
    content_type: String,
}

impl Builder {
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_config(Config {
            title: title.into(),
            version: version.into(),
            ..Config::default()
        })
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let mut doc = OpenApi::new(config.title, config.version);
        doc.openapi = config.openapi_version;
        doc.info.description = config.description;
        if !config.servers.is_empty() {
            doc.servers = Some(config.servers);
        }
        Self {
            doc,
            registry: Registry::new().with_prefix(config.schema_prefix),
            content_type: config.content_type,
        }
    }

    /// Replace the registry, e.g. to install a custom namer. Schemas already
    /// registered in the old registry are dropped.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.doc.info.description = Some(description.into());
        self
    }

    pub fn terms_of_service(&mut self, url: impl Into<String>) -> &mut Self {
        self.doc.info.terms_of_service = Some(url.into());
        self
    }

    pub fn contact(&mut self) -> ContactBuilder<'_> {
        ContactBuilder {
            contact: self.doc.info.contact.insert(Contact::default()),
        }
    }

    pub fn license(&mut self) -> LicenseBuilder<'_> {
        LicenseBuilder {
            license: self.doc.info.license.insert(License::default()),
        }
    }

    pub fn server(&mut self) -> ServerBuilder<'_> {
        ServerBuilder {
            server: push(self.doc.servers.get_or_insert_default(), Server::default()),
        }
    }

    /// Require `scheme` with `scopes` for every operation.
    pub fn security<I, S>(&mut self, scheme: impl Into<String>, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.doc
            .security
            .get_or_insert_default()
            .push(requirement(scheme.into(), scopes));
        self
    }

    /// HTTP basic authentication, registered as `BasicAuth`.
    pub fn basic_auth(&mut self) -> &mut Self {
        self.security_scheme("BasicAuth", http_scheme("basic"))
    }

    /// HTTP bearer authentication, registered as `BearerAuth`.
    pub fn bearer_auth(&mut self) -> &mut Self {
        self.security_scheme("BearerAuth", http_scheme("bearer"))
    }

    /// API key sent in `header`, registered as `ApiKeyAuth`.
    pub fn api_key_auth(&mut self, header: impl Into<String>) -> &mut Self {
        let mut scheme = SecurityScheme::new(SecuritySchemeType::ApiKey);
        scheme.r#in = Some("header".to_string());
        scheme.name = Some(header.into());
        self.security_scheme("ApiKeyAuth", scheme)
    }

    /// OpenID Connect discovery at `url`, registered as `OpenID`.
    pub fn open_id(&mut self, url: impl Into<String>) -> &mut Self {
        let mut scheme = SecurityScheme::new(SecuritySchemeType::OpenIdConnect);
        scheme.open_id_connect_url = Some(url.into());
        self.security_scheme("OpenID", scheme)
    }

    /// OAuth2, registered as `OAuth2`. Configure flows on the returned builder.
    pub fn oauth2(&mut self) -> OAuth2Builder<'_> {
        let scheme = self
            .security_schemes()
            .entry("OAuth2".to_string())
            .or_insert_with(|| SecurityScheme::new(SecuritySchemeType::OAuth2));
        *scheme = SecurityScheme::new(SecuritySchemeType::OAuth2);
        OAuth2Builder {
            flows: scheme.flows.insert(OAuthFlows::default()),
        }
    }

    pub fn security_scheme(
        &mut self,
        name: impl Into<String>,
        scheme: SecurityScheme,
    ) -> &mut Self {
        self.security_schemes().insert(name.into(), scheme);
        self
    }

    fn security_schemes(&mut self) -> &mut BTreeMap<String, SecurityScheme> {
        self.doc
            .components
            .get_or_insert_default()
            .security_schemes
            .get_or_insert_default()
    }

    /// Start a new operation at `method path`, replacing any operation
    /// already registered there.
    pub fn register(
        &mut self,
        method: HttpMethod,
        path: &str,
    ) -> Result<OperationBuilder<'_>, BuildError> {
        if path.is_empty() {
            return Err(BuildError::MissingPath);
        }
        debug!(%method, path, "registering operation");

        let op = self
            .doc
            .paths
            .entry(path.to_string())
            .or_default()
            .operation_mut(method);
        *op = Operation::default();

        Ok(OperationBuilder {
            op,
            registry: &mut self.registry,
            content_type: &self.content_type,
        })
    }

    /// Id of the first operation carrying `tag`, scanning paths in order.
    #[must_use]
    pub fn find_operation_id_by_tag(&self, tag: &str) -> Option<&str> {
        self.doc.paths.values().find_map(|item| {
            SEARCH_ORDER
                .iter()
                .filter_map(|method| item.get_operation(*method))
                .find(|op| op.tags.as_ref().is_some_and(|tags| tags.iter().any(|t| t == tag)))
                .and_then(|op| op.operation_id.as_deref())
        })
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The document built so far, with every registered schema.
    #[must_use]
    pub fn document(&self) -> OpenApi {
        let mut doc = self.doc.clone();
        attach_schemas(
            &mut doc,
            self.registry
                .schemas()
                .map(|(name, schema)| (name.to_string(), schema.clone()))
                .collect(),
        );
        doc
    }

    #[must_use]
    pub fn into_document(self) -> OpenApi {
        let mut doc = self.doc;
        attach_schemas(&mut doc, self.registry.into_schemas());
        doc
    }
}

fn attach_schemas(doc: &mut OpenApi, schemas: BTreeMap<String, apiforge_core::schema::Schema>) {
    if schemas.is_empty() {
        return;
    }
    doc.components
        .get_or_insert_with(Components::default)
        .schemas = Some(schemas);
}

fn http_scheme(scheme: &str) -> SecurityScheme {
    let mut security = SecurityScheme::new(SecuritySchemeType::Http);
    security.scheme = Some(scheme.to_string());
    security
}

fn requirement<I, S>(scheme: String, scopes: I) -> SecurityRequirement
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    BTreeMap::from([(scheme, scopes.into_iter().map(Into::into).collect())])
}

/// Append `item` and return it.
fn push<T>(items: &mut Vec<T>, item: T) -> &mut T {
    let index = items.len();
    items.push(item);
    &mut items[index]
}
