use apiforge_core::openapi::{Contact, License, Server, ServerVariable};
use apiforge_core::route::Example;
use apiforge_core::schema::{OAuthFlow, OAuthFlows};
use serde_json::Value;

use crate::error::BuildError;

pub struct ContactBuilder<'a> {
    pub(super) contact: &'a mut Contact,
}

impl ContactBuilder<'_> {
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.contact.name = Some(name.into());
        self
    }

    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.contact.url = Some(url.into());
        self
    }

    pub fn email(&mut self, email: impl Into<String>) -> &mut Self {
        self.contact.email = Some(email.into());
        self
    }
}

/// `identifier` and `url` are mutually exclusive.
pub struct LicenseBuilder<'a> {
    pub(super) license: &'a mut License,
}

impl LicenseBuilder<'_> {
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.license.name = name.into();
        self
    }

    /// SPDX license expression.
    pub fn identifier(&mut self, identifier: impl Into<String>) -> Result<&mut Self, BuildError> {
        if self.license.url.is_some() {
            return Err(BuildError::Conflict {
                first: "identifier",
                second: "url",
            });
        }
        self.license.identifier = Some(identifier.into());
        Ok(self)
    }

    pub fn url(&mut self, url: impl Into<String>) -> Result<&mut Self, BuildError> {
        if self.license.identifier.is_some() {
            return Err(BuildError::Conflict {
                first: "url",
                second: "identifier",
            });
        }
        self.license.url = Some(url.into());
        Ok(self)
    }
}

pub struct ServerBuilder<'a> {
    pub(super) server: &'a mut Server,
}

impl ServerBuilder<'_> {
    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.server.url = url.into();
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.server.description = Some(description.into());
        self
    }

    /// Add (or replace) a URL template variable.
    pub fn add_variable(&mut self, name: impl Into<String>) -> ServerVariableBuilder<'_> {
        let variables = self.server.variables.get_or_insert_default();
        let variable = variables.entry(name.into()).or_default();
        *variable = ServerVariable::default();
        ServerVariableBuilder { variable }
    }
}

pub struct ServerVariableBuilder<'a> {
    variable: &'a mut ServerVariable,
}

impl ServerVariableBuilder<'_> {
    pub fn enum_values<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variable.r#enum = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn default(&mut self, value: impl Into<String>) -> &mut Self {
        self.variable.default = value.into();
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.variable.description = Some(description.into());
        self
    }
}

/// `value` and `external_value` are mutually exclusive.
pub struct ExampleBuilder<'a> {
    pub(super) example: &'a mut Example,
}

impl ExampleBuilder<'_> {
    /// Point at a reusable example, e.g. `#/components/examples/cat`.
    pub fn reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.example.ref_path = Some(reference.into());
        self
    }

    pub fn value(&mut self, value: impl Into<Value>) -> Result<&mut Self, BuildError> {
        if self.example.external_value.is_some() {
            return Err(BuildError::Conflict {
                first: "value",
                second: "externalValue",
            });
        }
        self.example.value = Some(value.into());
        Ok(self)
    }

    pub fn external_value(&mut self, uri: impl Into<String>) -> Result<&mut Self, BuildError> {
        if self.example.value.is_some() {
            return Err(BuildError::Conflict {
                first: "externalValue",
                second: "value",
            });
        }
        self.example.external_value = Some(uri.into());
        Ok(self)
    }

    pub fn summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.example.summary = Some(summary.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.example.description = Some(description.into());
        self
    }
}

pub struct OAuth2Builder<'a> {
    pub(super) flows: &'a mut OAuthFlows,
}

impl OAuth2Builder<'_> {
    pub fn implicit(&mut self) -> OAuthFlowBuilder<'_> {
        OAuthFlowBuilder {
            flow: self.flows.implicit.insert(OAuthFlow::default()),
        }
    }

    pub fn password(&mut self) -> OAuthFlowBuilder<'_> {
        OAuthFlowBuilder {
            flow: self.flows.password.insert(OAuthFlow::default()),
        }
    }

    pub fn client_credentials(&mut self) -> OAuthFlowBuilder<'_> {
        OAuthFlowBuilder {
            flow: self.flows.client_credentials.insert(OAuthFlow::default()),
        }
    }

    pub fn authorization_code(&mut self) -> OAuthFlowBuilder<'_> {
        OAuthFlowBuilder {
            flow: self.flows.authorization_code.insert(OAuthFlow::default()),
        }
    }
}

pub struct OAuthFlowBuilder<'a> {
    flow: &'a mut OAuthFlow,
}

impl OAuthFlowBuilder<'_> {
    pub fn authorization_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.flow.authorization_url = Some(url.into());
        self
    }

    pub fn token_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.flow.token_url = Some(url.into());
        self
    }

    pub fn refresh_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.flow.refresh_url = Some(url.into());
        self
    }

    /// Replace the scopes with `(name, description)` pairs.
    pub fn scopes<I, K, V>(&mut self, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.flow.scopes = scopes
            .into_iter()
            .map(|(name, description)| (name.into(), description.into()))
            .collect();
        self
    }

    pub fn scope(&mut self, name: impl Into<String>, description: impl Into<String>) -> &mut Self {
        self.flow.scopes.insert(name.into(), description.into());
        self
    }
}
