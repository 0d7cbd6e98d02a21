//! OpenAPI 3.1 document model shared by the apiforge crates.

pub mod openapi;
pub mod route;
pub mod schema;

pub use schema::{Reference, Schema, SchemaRef, SchemaType};
