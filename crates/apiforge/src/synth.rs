//! Schema synthesis for a single classified shape.
//!
//! [`build`] never looks anything up itself: nested descriptors go through
//! the `resolve` callback, which is how the registry deduplicates structs and
//! breaks cycles.

use apiforge_core::schema::{Schema, SchemaRef};
use indexmap::IndexMap;
use tracing::trace;

use crate::describe::{Basic, Descriptor};
use crate::error::SchemaError;
use crate::introspect::{ObjectShape, Shape};
use crate::tags::Constraints;

/// Build the schema for `shape`, resolving nested types with `resolve`.
pub fn build(
    shape: &Shape,
    resolve: &mut dyn FnMut(&Descriptor) -> Result<SchemaRef, SchemaError>,
) -> Result<Schema, SchemaError> {
    match shape {
        Shape::Scalar(basic) => Ok(scalar(*basic)),
        Shape::Any => Ok(Schema::any()),
        Shape::Array { item, unique } => {
            let mut schema = Schema::array(resolve(item)?);
            if *unique {
                schema.unique_items = Some(true);
            }
            Ok(schema)
        }
        Shape::Map { value } => Ok(Schema::map(resolve(value)?)),
        Shape::Object(object) => build_object(object, resolve),
    }
}

/// Schema of a scalar sentinel.
#[must_use]
pub fn scalar(basic: Basic) -> Schema {
    match basic {
        Basic::Bool => Schema::boolean(),
        Basic::Int | Basic::Int128 => Schema::integer(),
        Basic::Int8 => Schema::integer().with_format("int8"),
        Basic::Int16 => Schema::integer().with_format("int16"),
        Basic::Int32 => Schema::integer().with_format("int32"),
        Basic::Int64 => Schema::integer().with_format("int64"),
        Basic::Uint | Basic::Uint128 => Schema {
            minimum: Some(0.0),
            ..Schema::integer()
        },
        Basic::Uint8 => Schema::integer().with_format("uint8"),
        Basic::Uint16 => Schema::integer().with_format("uint16"),
        Basic::Uint32 => Schema::integer().with_format("uint32"),
        Basic::Uint64 => Schema::integer().with_format("uint64"),
        Basic::Float32 => Schema::number().with_format("float"),
        Basic::Float64 => Schema::number().with_format("double"),
        Basic::String => Schema::string(),
        Basic::Char => Schema::string().with_format("char"),
    }
}

/// Attach field metadata to a resolved property schema.
///
/// Inline schemas are annotated in place. A reference is wrapped in `allOf`
/// when there is anything to attach, so the shared component stays intact.
#[must_use]
pub fn annotate(resolved: SchemaRef, constraints: &Constraints) -> SchemaRef {
    match resolved {
        SchemaRef::Inline(mut schema) => {
            constraints.apply(&mut schema);
            SchemaRef::Inline(schema)
        }
        SchemaRef::Ref(reference) => {
            let mut wrapper = Schema::default();
            constraints.apply(&mut wrapper);
            if wrapper == Schema::default() {
                SchemaRef::Ref(reference)
            } else {
                wrapper.all_of = Some(vec![SchemaRef::Ref(reference)]);
                SchemaRef::inline(wrapper)
            }
        }
    }
}

fn build_object(
    object: &ObjectShape,
    resolve: &mut dyn FnMut(&Descriptor) -> Result<SchemaRef, SchemaError>,
) -> Result<Schema, SchemaError> {
    let mut properties = IndexMap::with_capacity(object.properties.len());
    let mut required = Vec::new();

    for property in &object.properties {
        trace!(object = %object.name, property = %property.name, "synthesizing property");
        let resolved = resolve(&property.descriptor)?;
        properties.insert(
            property.name.clone(),
            annotate(resolved, &property.constraints),
        );
        if property.required {
            required.push(property.name.clone());
        }
    }

    let mut dependent_required = IndexMap::new();
    for property in &object.properties {
        let names = &property.constraints.dependent_required;
        if names.is_empty() {
            continue;
        }
        if let Some(missing) = names.iter().find(|n| !properties.contains_key(n.as_str())) {
            return Err(SchemaError::constraint(
                &property.field,
                "dependentRequired",
                format!("`{missing}` is not a property of `{}`", object.name),
            ));
        }
        dependent_required.insert(property.name.clone(), names.clone());
    }

    Ok(Schema {
        description: object.doc.clone(),
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        dependent_required: (!dependent_required.is_empty()).then_some(dependent_required),
        ..Schema::object()
    })
}
