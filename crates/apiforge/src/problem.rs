//! Error detail payload for API error responses.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Describe;

/// Details about one problem with a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Describe)]
pub struct ErrorDetail {
    /// Error message text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Where the error occurred, e.g. 'body.items[3].tags' or 'path.thing-id'
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,

    /// The value at the given location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, location: impl Into<String>, value: impl Into<Value>) -> Self {
        self.location = location.into();
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() && self.value.is_none() {
            return f.write_str(&self.message);
        }
        let value = self.value.as_ref().unwrap_or(&Value::Null);
        write!(f, "{} ({}: {value})", self.message, self.location)
    }
}

impl std::error::Error for ErrorDetail {}
