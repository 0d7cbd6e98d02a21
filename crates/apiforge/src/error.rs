use thiserror::Error;

/// Failure while turning a type descriptor into a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("type `{type_name}` cannot be described as a schema: {reason}")]
    UnsupportedType { type_name: String, reason: String },

    #[error("invalid `{key}` constraint on field `{field}`: {reason}")]
    InvalidConstraint {
        field: String,
        key: String,
        reason: String,
    },

    #[error("map `{type_name}` has key type `{key_type}`; only string keys are supported")]
    UnsupportedKeyType { type_name: String, key_type: String },

    #[error("could not find a free schema name derived from `{name}`")]
    NamingCollisionUnresolvable { name: String },
}

impl SchemaError {
    pub(crate) fn unsupported(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn constraint(
        field: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConstraint {
            field: field.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Failure while assembling an OpenAPI document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("`{first}` and `{second}` cannot both be set")]
    Conflict {
        first: &'static str,
        second: &'static str,
    },

    #[error("operation method and path must be specified")]
    MissingPath,

    #[error("callback event name must be specified")]
    MissingEvent,
}
