//! Field metadata tags.
//!
//! Tags are ordered `(key, value)` string pairs attached to a [`FieldDef`].
//! [`parse`] turns them into [`Constraints`], typing every value by the kind
//! of the field it annotates. Keys this module does not know are ignored so
//! tags can be shared with other consumers.
//!
//! [`FieldDef`]: crate::FieldDef

use apiforge_core::schema::{Schema, SchemaRef};
use serde_json::Value;
use tracing::trace;

use crate::describe::Basic;
use crate::error::SchemaError;

/// Value kind of the annotated field, after unwrapping optional wrappers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Integer(Basic),
    Float,
    String,
    Bool,
    Array(Box<Target>),
    Object,
    Any,
}

impl Target {
    #[must_use]
    pub const fn from_basic(basic: Basic) -> Self {
        match basic {
            Basic::Bool => Self::Bool,
            Basic::Float32 | Basic::Float64 => Self::Float,
            Basic::String | Basic::Char => Self::String,
            integer => Self::Integer(integer),
        }
    }

    const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object)
    }
}

/// Parsed field metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constraints {
    /// Property name from the `json` tag
    pub rename: Option<String>,
    /// `json:"-"`
    pub skip: bool,
    pub omit_empty: bool,
    pub hidden: bool,
    /// Explicit `required` override
    pub required: Option<bool>,

    pub description: Option<String>,
    pub format: Option<String>,
    pub enum_values: Option<Vec<Value>>,
    /// The enum constrains array items rather than the field itself
    pub enum_on_items: bool,
    pub default: Option<Value>,
    pub example: Option<Value>,

    pub minimum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,

    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub pattern_description: Option<String>,

    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: Option<bool>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,

    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub deprecated: Option<bool>,
    pub dependent_required: Vec<String>,
}

impl Constraints {
    /// The field is left out of the object schema.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skip || self.hidden
    }

    /// Copy schema-level metadata onto `schema`.
    pub fn apply(&self, schema: &mut Schema) {
        overlay(&mut schema.description, &self.description);
        overlay(&mut schema.format, &self.format);
        overlay(&mut schema.default, &self.default);
        overlay(&mut schema.example, &self.example);
        overlay(&mut schema.minimum, &self.minimum);
        overlay(&mut schema.exclusive_minimum, &self.exclusive_minimum);
        overlay(&mut schema.maximum, &self.maximum);
        overlay(&mut schema.exclusive_maximum, &self.exclusive_maximum);
        overlay(&mut schema.multiple_of, &self.multiple_of);
        overlay(&mut schema.min_length, &self.min_length);
        overlay(&mut schema.max_length, &self.max_length);
        overlay(&mut schema.pattern, &self.pattern);
        overlay(&mut schema.pattern_description, &self.pattern_description);
        overlay(&mut schema.min_items, &self.min_items);
        overlay(&mut schema.max_items, &self.max_items);
        overlay(&mut schema.unique_items, &self.unique_items);
        overlay(&mut schema.min_properties, &self.min_properties);
        overlay(&mut schema.max_properties, &self.max_properties);
        overlay(&mut schema.read_only, &self.read_only);
        overlay(&mut schema.write_only, &self.write_only);
        overlay(&mut schema.deprecated, &self.deprecated);

        if let Some(values) = &self.enum_values {
            match schema.items.as_deref_mut() {
                Some(SchemaRef::Inline(items)) if self.enum_on_items => {
                    items.r#enum = Some(values.clone());
                }
                _ => schema.r#enum = Some(values.clone()),
            }
        }
    }
}

fn overlay<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if src.is_some() {
        dst.clone_from(src);
    }
}

/// Parse a field's tags against the field's value kind.
pub fn parse(
    field: &str,
    tags: &[(String, String)],
    target: &Target,
) -> Result<Constraints, SchemaError> {
    let mut c = Constraints::default();

    for (key, value) in tags {
        let invalid = |reason: String| SchemaError::constraint(field, key.as_str(), reason);
        match key.as_str() {
            "json" => parse_json_tag(value, &mut c),
            "doc" => c.description = Some(value.clone()),
            "format" => c.format = Some(value.clone()),
            "enum" => {
                let (element, on_items) = match target {
                    Target::Array(item) => (item.as_ref(), true),
                    other => (other, false),
                };
                if !element.is_scalar() {
                    return Err(invalid("enum values require a scalar field".into()));
                }
                let values: Vec<Value> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| typed_enum_value(v, element).map_err(&invalid))
                    .collect::<Result<_, _>>()?;
                if values.is_empty() {
                    return Err(invalid("enum must list at least one value".into()));
                }
                c.enum_values = Some(values);
                c.enum_on_items = on_items;
            }
            "default" => c.default = Some(opaque_value(value, target)),
            "example" => c.example = Some(opaque_value(value, target)),
            "minimum" => c.minimum = Some(numeric(value, target).map_err(invalid)?),
            "exclusiveMinimum" => {
                c.exclusive_minimum = Some(numeric(value, target).map_err(invalid)?);
            }
            "maximum" => c.maximum = Some(numeric(value, target).map_err(invalid)?),
            "exclusiveMaximum" => {
                c.exclusive_maximum = Some(numeric(value, target).map_err(invalid)?);
            }
            "multipleOf" => {
                let step = numeric(value, target).map_err(&invalid)?;
                if step <= 0.0 {
                    return Err(invalid("must be greater than zero".into()));
                }
                c.multiple_of = Some(step);
            }
            "minLength" => c.min_length = Some(count(value).map_err(invalid)?),
            "maxLength" => c.max_length = Some(count(value).map_err(invalid)?),
            "minItems" => c.min_items = Some(count(value).map_err(invalid)?),
            "maxItems" => c.max_items = Some(count(value).map_err(invalid)?),
            "minProperties" => c.min_properties = Some(count(value).map_err(invalid)?),
            "maxProperties" => c.max_properties = Some(count(value).map_err(invalid)?),
            "pattern" => {
                regex::Regex::new(value).map_err(|err| invalid(err.to_string()))?;
                c.pattern = Some(value.clone());
            }
            "patternDescription" => c.pattern_description = Some(value.clone()),
            "uniqueItems" => c.unique_items = Some(flag(value).map_err(invalid)?),
            "readOnly" => c.read_only = Some(flag(value).map_err(invalid)?),
            "writeOnly" => c.write_only = Some(flag(value).map_err(invalid)?),
            "deprecated" => c.deprecated = Some(flag(value).map_err(invalid)?),
            "hidden" => c.hidden = flag(value).map_err(invalid)?,
            "required" => c.required = Some(flag(value).map_err(invalid)?),
            "dependentRequired" => {
                let names: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                if names.is_empty() {
                    return Err(invalid("expected a comma separated list of properties".into()));
                }
                c.dependent_required = names;
            }
            other => trace!(field, key = other, "ignoring unknown tag"),
        }
    }

    if c.read_only == Some(true) && c.write_only == Some(true) {
        return Err(SchemaError::constraint(
            field,
            "readOnly",
            "a field cannot be both readOnly and writeOnly",
        ));
    }

    Ok(c)
}

fn parse_json_tag(value: &str, c: &mut Constraints) {
    if value == "-" {
        c.skip = true;
        return;
    }
    let mut parts = value.split(',');
    if let Some(name) = parts.next().map(str::trim).filter(|n| !n.is_empty()) {
        c.rename = Some(name.to_string());
    }
    for option in parts {
        if matches!(option.trim(), "omitempty" | "omitzero") {
            c.omit_empty = true;
        }
    }
}

fn flag(value: &str) -> Result<bool, String> {
    match value.trim() {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected `true` or `false`, got `{other}`")),
    }
}

fn count(value: &str) -> Result<usize, String> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("expected a non-negative integer, got `{value}`"))
}

fn parse_integer(value: &str, basic: Basic) -> Result<i128, String> {
    let parsed = value
        .trim()
        .parse::<i128>()
        .map_err(|_| format!("expected an integer, got `{value}`"))?;
    match basic.integer_range() {
        Some((min, max)) if parsed < min || parsed > max => Err(format!(
            "{parsed} is out of range for {}",
            basic.display_name()
        )),
        _ => Ok(parsed),
    }
}

fn parse_float(value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("expected a number, got `{value}`"))
}

#[allow(clippy::cast_precision_loss)]
fn numeric(value: &str, target: &Target) -> Result<f64, String> {
    match target {
        Target::Integer(basic) => parse_integer(value, *basic).map(|v| v as f64),
        Target::Float => parse_float(value),
        _ => Err("numeric constraints apply only to number fields".into()),
    }
}

fn integer_value(v: i128) -> Value {
    i64::try_from(v)
        .map(Value::from)
        .or_else(|_| u64::try_from(v).map(Value::from))
        .unwrap_or_else(|_| Value::String(v.to_string()))
}

fn typed_enum_value(value: &str, target: &Target) -> Result<Value, String> {
    match target {
        Target::Integer(basic) => parse_integer(value, *basic).map(integer_value),
        Target::Float => parse_float(value).map(Value::from),
        Target::Bool => flag(value).map(Value::Bool),
        Target::Any => Ok(serde_json::from_str(value).unwrap_or_else(|_| Value::from(value))),
        Target::String | Target::Array(_) | Target::Object => Ok(Value::from(value)),
    }
}

/// `default` and `example` are typed when the value parses as the field's
/// kind and kept as strings otherwise.
fn opaque_value(value: &str, target: &Target) -> Value {
    let fallback = || Value::from(value);
    match target {
        Target::Integer(_) => value
            .trim()
            .parse::<i128>()
            .map(integer_value)
            .unwrap_or_else(|_| fallback()),
        Target::Float => parse_float(value).map(Value::from).unwrap_or_else(|_| fallback()),
        Target::Bool => value
            .trim()
            .parse::<bool>()
            .map(Value::Bool)
            .unwrap_or_else(|_| fallback()),
        Target::String => fallback(),
        Target::Array(_) | Target::Object | Target::Any => {
            serde_json::from_str(value).unwrap_or_else(|_| fallback())
        }
    }
}
