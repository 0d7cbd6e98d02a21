//! apiforge - JSON Schema and OpenAPI documents from Rust types
//!
//! Types describe themselves through [`Describe`] (usually derived). A
//! [`Registry`] turns descriptors into named, deduplicated component schemas,
//! and the [`Builder`] assembles operations around them into an [`OpenApi`]
//! document.

extern crate self as apiforge;

pub mod builder;
pub mod config;
pub mod describe;
pub mod error;
pub mod introspect;
pub mod problem;
pub mod registry;
pub mod scalar;
pub mod synth;
pub mod tags;

// Re-export apiforge_core types so users don't need to depend on apiforge_core directly
pub mod schema {
    pub use apiforge_core::schema::*;
}

pub mod route {
    pub use apiforge_core::route::*;
}

pub mod openapi {
    pub use apiforge_core::openapi::*;
}

pub use apiforge_core::openapi::OpenApi;

// The derive macro and the trait share a name, like serde's
pub use apiforge_macro::Describe;

pub use builder::Builder;
pub use config::Config;
pub use describe::{
    BOOL_TYPE, BYTE_TYPE, Basic, Describe, Descriptor, FLOAT32_TYPE, FLOAT64_TYPE, FieldDef,
    INT_TYPE, INT8_TYPE, INT16_TYPE, INT32_TYPE, INT64_TYPE, Kind, RUNE_TYPE, STRING_TYPE,
    TypeIdentity, UINT_TYPE, UINT8_TYPE, UINT16_TYPE, UINT32_TYPE, UINT64_TYPE, UINTPTR_TYPE,
};
pub use error::{BuildError, SchemaError};
pub use problem::ErrorDetail;
pub use registry::Registry;
pub use scalar::scalar_html;

pub use serde_json;
