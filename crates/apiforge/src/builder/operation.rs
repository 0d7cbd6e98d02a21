use std::collections::BTreeMap;

use apiforge_core::openapi::Server;
use apiforge_core::route::{
    Example, Header, HttpMethod, Link, MediaType, Operation, Parameter, ParameterLocation,
    ParameterStyle, RequestBody, Response,
};
use apiforge_core::schema::SchemaRef;
use serde_json::Value;
use tracing::debug;

use super::parts::{ExampleBuilder, ServerBuilder};
use super::{push, requirement};
use crate::describe::{Describe, Descriptor};
use crate::error::BuildError;
use crate::registry::Registry;

/// Builds one operation. Obtained from [`Builder::register`] or
/// [`OperationBuilder::callback`].
///
/// [`Builder::register`]: super::Builder::register
pub struct OperationBuilder<'a> {
    pub(super) op: &'a mut Operation,
    pub(super) registry: &'a mut Registry,
    pub(super) content_type: &'a str,
}

impl OperationBuilder<'_> {
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.op.tags.get_or_insert_default().push(tag.into());
        self
    }

    pub fn summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.op.summary = Some(summary.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.op.description = Some(description.into());
        self
    }

    /// Also used to name anonymous request and response bodies.
    pub fn operation_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.op.operation_id = Some(id.into());
        self
    }

    pub fn deprecated(&mut self, deprecated: bool) -> &mut Self {
        self.op.deprecated = Some(deprecated);
        self
    }

    /// Require `scheme` with `scopes` for this operation.
    pub fn security<I, S>(&mut self, scheme: impl Into<String>, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.op
            .security
            .get_or_insert_default()
            .push(requirement(scheme.into(), scopes));
        self
    }

    pub fn server(&mut self) -> ServerBuilder<'_> {
        ServerBuilder {
            server: push(self.op.servers.get_or_insert_default(), Server::default()),
        }
    }

    pub fn request(&mut self) -> RequestBuilder<'_> {
        let hint = body_hint(&*self.op, "Request");
        RequestBuilder {
            op: &mut *self.op,
            registry: &mut *self.registry,
            default_content_type: self.content_type.to_string(),
            next_content_type: None,
            hint,
        }
    }

    /// Response for an HTTP status code, created on first use.
    pub fn response(&mut self, status: u16) -> ResponseBuilder<'_> {
        self.response_for(status.to_string())
    }

    /// The `default` response, used for any status not listed.
    pub fn default_response(&mut self) -> ResponseBuilder<'_> {
        self.response_for("default".to_string())
    }

    fn response_for(&mut self, key: String) -> ResponseBuilder<'_> {
        let hint = body_hint(&*self.op, &format!("Response{}", capitalize(&key)));
        ResponseBuilder {
            response: self.op.responses.entry(key).or_default(),
            registry: &mut *self.registry,
            default_content_type: self.content_type.to_string(),
            next_content_type: None,
            hint,
        }
    }

    /// Describe a request the API makes back to the client when `event`
    /// happens. `path` is usually a runtime expression such as
    /// `{$request.body#/callbackUrl}`.
    pub fn callback(
        &mut self,
        event: &str,
        method: HttpMethod,
        path: &str,
    ) -> Result<OperationBuilder<'_>, BuildError> {
        if event.is_empty() {
            return Err(BuildError::MissingEvent);
        }
        if path.is_empty() {
            return Err(BuildError::MissingPath);
        }
        debug!(event, %method, path, "registering callback");

        let item = self
            .op
            .callbacks
            .get_or_insert_default()
            .entry(event.to_string())
            .or_default()
            .entry(path.to_string())
            .or_default();
        let op = item.operation_mut(method);
        *op = Operation::default();

        Ok(OperationBuilder {
            op,
            registry: &mut *self.registry,
            content_type: self.content_type,
        })
    }
}

fn body_hint(op: &Operation, suffix: &str) -> Option<String> {
    op.operation_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| format!("{}{suffix}", capitalize(id)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

pub struct RequestBuilder<'a> {
    op: &'a mut Operation,
    registry: &'a mut Registry,
    default_content_type: String,
    next_content_type: Option<String>,
    hint: Option<String>,
}

impl RequestBuilder<'_> {
    /// Content type for every following `body` call.
    pub fn default_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Content type for the next `body` call only.
    pub fn content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.next_content_type = Some(content_type.into());
        self
    }

    pub fn body<T: Describe + ?Sized>(&mut self) -> Result<RequestBodyBuilder<'_>, BuildError> {
        self.body_of(&T::descriptor())
    }

    /// Set the body schema for the current content type. The request body is
    /// marked required when it is first created.
    pub fn body_of(
        &mut self,
        descriptor: &Descriptor,
    ) -> Result<RequestBodyBuilder<'_>, BuildError> {
        let schema = self
            .registry
            .resolve(descriptor, true, self.hint.as_deref())?;
        let content_type = self
            .next_content_type
            .take()
            .unwrap_or_else(|| self.default_content_type.clone());

        let body = self.op.request_body.get_or_insert_with(|| RequestBody {
            required: Some(true),
            ..RequestBody::default()
        });
        body.content.insert(
            content_type.clone(),
            MediaType {
                schema: Some(schema),
                ..MediaType::default()
            },
        );
        Ok(RequestBodyBuilder { body, content_type })
    }

    pub fn query_param<T: Describe + ?Sized>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<ParamBuilder<'_>, BuildError> {
        self.param(ParameterLocation::Query, name, &T::descriptor())
    }

    /// Path parameters are always required.
    pub fn path_param<T: Describe + ?Sized>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<ParamBuilder<'_>, BuildError> {
        self.param(ParameterLocation::Path, name, &T::descriptor())
    }

    pub fn header_param<T: Describe + ?Sized>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<ParamBuilder<'_>, BuildError> {
        self.param(ParameterLocation::Header, name, &T::descriptor())
    }

    pub fn cookie_param<T: Describe + ?Sized>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<ParamBuilder<'_>, BuildError> {
        self.param(ParameterLocation::Cookie, name, &T::descriptor())
    }

    pub fn param(
        &mut self,
        location: ParameterLocation,
        name: impl Into<String>,
        descriptor: &Descriptor,
    ) -> Result<ParamBuilder<'_>, BuildError> {
        let schema = self.registry.resolve(descriptor, true, None)?;
        let mut param = Parameter::new(name, location);
        param.schema = Some(schema);
        if location == ParameterLocation::Path {
            param.required = Some(true);
        }
        Ok(ParamBuilder {
            param: push(self.op.parameters.get_or_insert_default(), param),
        })
    }
}

pub struct RequestBodyBuilder<'a> {
    body: &'a mut RequestBody,
    content_type: String,
}

impl RequestBodyBuilder<'_> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.body.description = Some(description.into());
        self
    }

    pub fn required(&mut self, required: bool) -> &mut Self {
        self.body.required = Some(required);
        self
    }

    /// Example for the media type this body was set on.
    pub fn example(&mut self, example: impl Into<Value>) -> &mut Self {
        self.media().example = Some(example.into());
        self
    }

    pub fn add_example(&mut self, name: impl Into<String>) -> ExampleBuilder<'_> {
        add_example(&mut self.media().examples, name.into())
    }

    fn media(&mut self) -> &mut MediaType {
        self.body.content.entry(self.content_type.clone()).or_default()
    }
}

pub struct ParamBuilder<'a> {
    param: &'a mut Parameter,
}

impl ParamBuilder<'_> {
    /// Override the location given when the parameter was added.
    pub fn location(&mut self, location: ParameterLocation) -> &mut Self {
        self.param.r#in = location;
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.param.description = Some(description.into());
        self
    }

    pub fn required(&mut self, required: bool) -> &mut Self {
        self.param.required = Some(required);
        self
    }

    pub fn deprecated(&mut self, deprecated: bool) -> &mut Self {
        self.param.deprecated = Some(deprecated);
        self
    }

    /// Single example. Use [`ParamBuilder::add_example`] for named ones.
    pub fn example(&mut self, example: impl Into<Value>) -> &mut Self {
        self.param.example = Some(example.into());
        self
    }

    pub fn add_example(&mut self, name: impl Into<String>) -> ExampleBuilder<'_> {
        add_example(&mut self.param.examples, name.into())
    }

    pub fn style(&mut self, style: ParameterStyle) -> &mut Self {
        self.param.style = Some(style);
        self
    }

    pub fn explode(&mut self, explode: bool) -> &mut Self {
        self.param.explode = Some(explode);
        self
    }
}

pub struct ResponseBuilder<'a> {
    response: &'a mut Response,
    registry: &'a mut Registry,
    default_content_type: String,
    next_content_type: Option<String>,
    hint: Option<String>,
}

impl ResponseBuilder<'_> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.response.description = description.into();
        self
    }

    pub fn default_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.default_content_type = content_type.into();
        self
    }

    pub fn content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.next_content_type = Some(content_type.into());
        self
    }

    pub fn body<T: Describe + ?Sized>(&mut self) -> Result<MediaTypeBuilder<'_>, BuildError> {
        self.body_of(&T::descriptor())
    }

    /// Set the body schema for the current content type. A content type that
    /// already has a schema keeps it; use [`MediaTypeBuilder::schema`] to
    /// replace it.
    pub fn body_of(
        &mut self,
        descriptor: &Descriptor,
    ) -> Result<MediaTypeBuilder<'_>, BuildError> {
        let schema = self
            .registry
            .resolve(descriptor, true, self.hint.as_deref())?;
        let content_type = self
            .next_content_type
            .take()
            .unwrap_or_else(|| self.default_content_type.clone());

        let media = self
            .response
            .content
            .get_or_insert_default()
            .entry(content_type)
            .or_default();
        media.schema.get_or_insert(schema);

        Ok(MediaTypeBuilder {
            media,
            registry: &mut *self.registry,
            hint: self.hint.clone(),
        })
    }

    pub fn header<T: Describe + ?Sized>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<HeaderBuilder<'_>, BuildError> {
        let schema = self.registry.resolve(&T::descriptor(), true, None)?;
        let header = self
            .response
            .headers
            .get_or_insert_default()
            .entry(name.into())
            .or_default();
        *header = Header {
            schema: Some(schema),
            ..Header::default()
        };
        Ok(HeaderBuilder { header })
    }

    pub fn link(&mut self, name: impl Into<String>) -> LinkBuilder<'_> {
        let link = self
            .response
            .links
            .get_or_insert_default()
            .entry(name.into())
            .or_default();
        *link = Link::default();
        LinkBuilder { link }
    }
}

pub struct MediaTypeBuilder<'a> {
    media: &'a mut MediaType,
    registry: &'a mut Registry,
    hint: Option<String>,
}

impl MediaTypeBuilder<'_> {
    /// Replace the schema with `T`'s.
    pub fn schema<T: Describe + ?Sized>(&mut self) -> Result<&mut Self, BuildError> {
        self.schema_of(&T::descriptor())
    }

    pub fn schema_of(&mut self, descriptor: &Descriptor) -> Result<&mut Self, BuildError> {
        let schema: SchemaRef = self
            .registry
            .resolve(descriptor, true, self.hint.as_deref())?;
        self.media.schema = Some(schema);
        Ok(self)
    }

    pub fn example(&mut self, example: impl Into<Value>) -> &mut Self {
        self.media.example = Some(example.into());
        self
    }

    pub fn add_example(&mut self, name: impl Into<String>) -> ExampleBuilder<'_> {
        add_example(&mut self.media.examples, name.into())
    }
}

pub struct HeaderBuilder<'a> {
    header: &'a mut Header,
}

impl HeaderBuilder<'_> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.header.description = Some(description.into());
        self
    }

    pub fn required(&mut self, required: bool) -> &mut Self {
        self.header.required = Some(required);
        self
    }

    pub fn example(&mut self, example: impl Into<Value>) -> &mut Self {
        self.header.example = Some(example.into());
        self
    }
}

/// `operation_id` and `operation_ref` are mutually exclusive.
pub struct LinkBuilder<'a> {
    link: &'a mut Link,
}

impl LinkBuilder<'_> {
    pub fn operation_id(&mut self, id: impl Into<String>) -> Result<&mut Self, BuildError> {
        if self.link.operation_ref.is_some() {
            return Err(BuildError::Conflict {
                first: "operationId",
                second: "operationRef",
            });
        }
        self.link.operation_id = Some(id.into());
        Ok(self)
    }

    pub fn operation_ref(
        &mut self,
        reference: impl Into<String>,
    ) -> Result<&mut Self, BuildError> {
        if self.link.operation_id.is_some() {
            return Err(BuildError::Conflict {
                first: "operationRef",
                second: "operationId",
            });
        }
        self.link.operation_ref = Some(reference.into());
        Ok(self)
    }

    /// `expression` is a runtime expression such as `$response.body#/id`,
    /// or a constant.
    pub fn add_param(
        &mut self,
        name: impl Into<String>,
        expression: impl Into<Value>,
    ) -> &mut Self {
        self.link
            .parameters
            .get_or_insert_default()
            .insert(name.into(), expression.into());
        self
    }

    pub fn request_body(&mut self, expression: impl Into<Value>) -> &mut Self {
        self.link.request_body = Some(expression.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.link.description = Some(description.into());
        self
    }

    pub fn server(&mut self) -> ServerBuilder<'_> {
        ServerBuilder {
            server: self.link.server.insert(Server::default()),
        }
    }
}

fn add_example(
    examples: &mut Option<BTreeMap<String, Example>>,
    name: String,
) -> ExampleBuilder<'_> {
    let example = examples.get_or_insert_default().entry(name).or_default();
    *example = Example::default();
    ExampleBuilder { example }
}
