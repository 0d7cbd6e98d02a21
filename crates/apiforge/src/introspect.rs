//! Classification of descriptors into schema shapes.

use tracing::trace;

use crate::describe::{Basic, Descriptor, Kind};
use crate::error::SchemaError;
use crate::tags::{self, Constraints, Target};

/// One object property, ready for synthesis.
#[derive(Clone, Debug)]
pub struct Property {
    /// Serialized property name
    pub name: String,
    /// Declared field name
    pub field: String,
    /// Field type with optional wrappers removed
    pub descriptor: Descriptor,
    pub required: bool,
    pub constraints: Constraints,
}

#[derive(Clone, Debug)]
pub struct ObjectShape {
    pub name: String,
    pub doc: Option<String>,
    /// Visible properties in declaration order
    pub properties: Vec<Property>,
}

impl ObjectShape {
    /// No property reaches another struct, directly or through
    /// optional, array or map wrappers.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !self.properties.iter().any(|p| reaches_struct(&p.descriptor))
    }
}

/// Schema-relevant shape of a descriptor.
#[derive(Clone, Debug)]
pub enum Shape {
    Scalar(Basic),
    Any,
    Array { item: Descriptor, unique: bool },
    Map { value: Descriptor },
    Object(ObjectShape),
}

/// Classify a descriptor. Struct fields have their tags parsed here, so tag
/// errors surface before anything is synthesized.
///
/// An optional wrapper classifies as the wrapped type. Optionality only
/// matters for struct fields, where it drops the field from `required`.
pub fn classify(descriptor: &Descriptor) -> Result<Shape, SchemaError> {
    match descriptor.kind() {
        Kind::Basic(basic) => Ok(Shape::Scalar(*basic)),
        Kind::Any => Ok(Shape::Any),
        Kind::Optional(inner) => classify(&inner()),
        Kind::Sequence { item, unique } => Ok(Shape::Array {
            item: item(),
            unique: *unique,
        }),
        Kind::Map { key, value } => {
            let key = key();
            if !matches!(key.kind(), Kind::Basic(Basic::String)) {
                return Err(SchemaError::UnsupportedKeyType {
                    type_name: descriptor.identity().type_name().to_string(),
                    key_type: key.identity().type_name().to_string(),
                });
            }
            Ok(Shape::Map { value: value() })
        }
        Kind::Opaque(what) => Err(SchemaError::unsupported(
            descriptor.identity().type_name(),
            format!("{what} values have no JSON representation"),
        )),
        Kind::Struct(fields) => {
            if !fields.is_empty() && !fields.iter().any(|f| f.is_exported()) {
                return Err(SchemaError::unsupported(
                    descriptor.identity().type_name(),
                    "struct has no exported fields",
                ));
            }

            let mut properties: Vec<Property> = Vec::with_capacity(fields.len());
            for field in fields.iter().filter(|f| f.is_exported()) {
                let (optional, inner) = strip_optional(field.descriptor());
                let target = target_of(&inner);
                let constraints = tags::parse(field.name(), field.tags(), &target)?;
                if constraints.is_skipped() {
                    trace!(field = field.name(), "skipping field");
                    continue;
                }

                let name = constraints
                    .rename
                    .clone()
                    .unwrap_or_else(|| field.name().to_string());
                if properties.iter().any(|p| p.name == name) {
                    return Err(SchemaError::constraint(
                        field.name(),
                        "json",
                        format!("property name `{name}` is used by another field"),
                    ));
                }
                let required = constraints
                    .required
                    .unwrap_or(!optional && !constraints.omit_empty);

                properties.push(Property {
                    name,
                    field: field.name().to_string(),
                    descriptor: inner,
                    required,
                    constraints,
                });
            }

            Ok(Shape::Object(ObjectShape {
                name: descriptor.name().to_string(),
                doc: descriptor.doc().map(String::from),
                properties,
            }))
        }
    }
}

/// Remove any number of optional wrappers. Returns whether one was present.
#[must_use]
pub fn strip_optional(descriptor: Descriptor) -> (bool, Descriptor) {
    let mut optional = false;
    let mut current = descriptor;
    while let Kind::Optional(inner) = current.kind() {
        let next = inner();
        optional = true;
        current = next;
    }
    (optional, current)
}

/// Value kind used to type a field's tags.
#[must_use]
pub fn target_of(descriptor: &Descriptor) -> Target {
    match descriptor.kind() {
        Kind::Basic(basic) => Target::from_basic(*basic),
        Kind::Optional(inner) => target_of(&inner()),
        Kind::Sequence { item, .. } => Target::Array(Box::new(target_of(&item()))),
        Kind::Map { .. } | Kind::Struct(_) => Target::Object,
        Kind::Any | Kind::Opaque(_) => Target::Any,
    }
}

fn reaches_struct(descriptor: &Descriptor) -> bool {
    match descriptor.kind() {
        Kind::Struct(_) => true,
        Kind::Optional(inner) => reaches_struct(&inner()),
        Kind::Sequence { item, .. } => reaches_struct(&item()),
        Kind::Map { value, .. } => reaches_struct(&value()),
        Kind::Basic(_) | Kind::Any | Kind::Opaque(_) => false,
    }
}
