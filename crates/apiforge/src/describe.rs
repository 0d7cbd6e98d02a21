//! Type descriptors.
//!
//! A [`Descriptor`] is the runtime description of one Rust type: its identity,
//! a display name, an optional doc string and a [`Kind`]. Nested types are held
//! as `fn() -> Descriptor` pointers, so producing a descriptor never walks into
//! the types it mentions and self-referential types are cheap to describe.
//!
//! Implement [`Describe`] with `#[derive(Describe)]` for structs, or by hand:
//!
//! ```
//! use apiforge::{Describe, Descriptor, FieldDef};
//!
//! struct Point {
//!     x: f64,
//!     y: f64,
//! }
//!
//! impl Describe for Point {
//!     fn descriptor() -> Descriptor {
//!         Descriptor::structure::<Self>(
//!             "Point",
//!             vec![
//!                 FieldDef::new::<f64>("x").with_tag("json", "x"),
//!                 FieldDef::new::<f64>("y").with_tag("json", "y"),
//!             ],
//!         )
//!     }
//! }
//! ```

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc;

use indexmap::{IndexMap, IndexSet};

/// Lazily produces the descriptor of a nested type.
pub type DescriptorFn = fn() -> Descriptor;

/// Types that can describe their own shape.
pub trait Describe: 'static {
    fn descriptor() -> Descriptor;
}

/// Identity of a described type. Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy, Debug)]
pub struct TypeIdentity {
    id: TypeId,
    type_name: &'static str,
}

impl TypeIdentity {
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified Rust type name, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIdentity {}

impl Hash for TypeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Scalar kinds with a direct JSON Schema mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Basic {
    Bool,
    /// Pointer-sized signed integer
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    /// Pointer-sized unsigned integer
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint128,
    Float32,
    Float64,
    String,
    Char,
}

pub const INT_TYPE: Basic = Basic::Int;
pub const INT8_TYPE: Basic = Basic::Int8;
pub const INT16_TYPE: Basic = Basic::Int16;
pub const INT32_TYPE: Basic = Basic::Int32;
pub const INT64_TYPE: Basic = Basic::Int64;
pub const UINT_TYPE: Basic = Basic::Uint;
pub const UINT8_TYPE: Basic = Basic::Uint8;
pub const UINT16_TYPE: Basic = Basic::Uint16;
pub const UINT32_TYPE: Basic = Basic::Uint32;
pub const UINT64_TYPE: Basic = Basic::Uint64;
pub const UINTPTR_TYPE: Basic = Basic::Uint;
pub const FLOAT32_TYPE: Basic = Basic::Float32;
pub const FLOAT64_TYPE: Basic = Basic::Float64;
pub const STRING_TYPE: Basic = Basic::String;
pub const BOOL_TYPE: Basic = Basic::Bool;
pub const BYTE_TYPE: Basic = Basic::Uint8;
pub const RUNE_TYPE: Basic = Basic::Char;

impl Basic {
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Int128 => "Int128",
            Self::Uint => "Uint",
            Self::Uint8 => "Uint8",
            Self::Uint16 => "Uint16",
            Self::Uint32 => "Uint32",
            Self::Uint64 => "Uint64",
            Self::Uint128 => "Uint128",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Char => "Char",
        }
    }

    /// Inclusive value range for integer kinds, `None` otherwise.
    ///
    /// `Uint128` is capped at `i128::MAX`.
    #[must_use]
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        Some(match self {
            Self::Int8 => (i8::MIN as i128, i8::MAX as i128),
            Self::Int16 => (i16::MIN as i128, i16::MAX as i128),
            Self::Int32 => (i32::MIN as i128, i32::MAX as i128),
            Self::Int | Self::Int64 => (i64::MIN as i128, i64::MAX as i128),
            Self::Int128 => (i128::MIN, i128::MAX),
            Self::Uint8 => (0, u8::MAX as i128),
            Self::Uint16 => (0, u16::MAX as i128),
            Self::Uint32 => (0, u32::MAX as i128),
            Self::Uint | Self::Uint64 => (0, u64::MAX as i128),
            Self::Uint128 => (0, i128::MAX),
            Self::Bool | Self::Float32 | Self::Float64 | Self::String | Self::Char => {
                return None;
            }
        })
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Descriptor of the Rust primitive this sentinel stands for.
    #[must_use]
    pub fn descriptor(self) -> Descriptor {
        match self {
            Self::Bool => bool::descriptor(),
            Self::Int => isize::descriptor(),
            Self::Int8 => i8::descriptor(),
            Self::Int16 => i16::descriptor(),
            Self::Int32 => i32::descriptor(),
            Self::Int64 => i64::descriptor(),
            Self::Int128 => i128::descriptor(),
            Self::Uint => usize::descriptor(),
            Self::Uint8 => u8::descriptor(),
            Self::Uint16 => u16::descriptor(),
            Self::Uint32 => u32::descriptor(),
            Self::Uint64 => u64::descriptor(),
            Self::Uint128 => u128::descriptor(),
            Self::Float32 => f32::descriptor(),
            Self::Float64 => f64::descriptor(),
            Self::String => String::descriptor(),
            Self::Char => char::descriptor(),
        }
    }
}

impl From<Basic> for Descriptor {
    fn from(basic: Basic) -> Self {
        basic.descriptor()
    }
}

/// Structural kind of a described type.
#[derive(Clone, Debug)]
pub enum Kind {
    Basic(Basic),
    /// Any JSON value
    Any,
    Sequence {
        item: DescriptorFn,
        unique: bool,
    },
    Map {
        key: DescriptorFn,
        value: DescriptorFn,
    },
    Struct(Vec<FieldDef>),
    Optional(DescriptorFn),
    /// A type with no schema representation (functions, channels)
    Opaque(&'static str),
}

/// Runtime description of one type.
#[derive(Clone, Debug)]
pub struct Descriptor {
    identity: TypeIdentity,
    name: String,
    doc: Option<String>,
    kind: Kind,
}

impl Descriptor {
    pub fn new<T: ?Sized + 'static>(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            identity: TypeIdentity::of::<T>(),
            name: name.into(),
            doc: None,
            kind,
        }
    }

    /// Struct descriptor with fields in declaration order.
    pub fn structure<T: ?Sized + 'static>(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self::new::<T>(name, Kind::Struct(fields))
    }

    /// Struct descriptor without a name. The registry names it from the
    /// caller's hint, or `Anonymous`.
    #[must_use]
    pub fn anonymous<T: ?Sized + 'static>(fields: Vec<FieldDef>) -> Self {
        Self::new::<T>(String::new(), Kind::Struct(fields))
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub const fn identity(&self) -> TypeIdentity {
        self.identity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[must_use]
    pub const fn kind(&self) -> &Kind {
        &self.kind
    }

    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self.kind, Kind::Struct(_))
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// One declared struct field.
#[derive(Clone, Debug)]
pub struct FieldDef {
    name: String,
    ty: DescriptorFn,
    tags: Vec<(String, String)>,
    exported: bool,
}

impl FieldDef {
    pub fn new<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: T::descriptor,
            tags: Vec::new(),
            exported: true,
        }
    }

    /// Append a metadata tag. Later tags with the same key override earlier ones.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Mark the field as not part of the serialized form.
    #[must_use]
    pub const fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        (self.ty)()
    }

    #[must_use]
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Last value given for `key`.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub const fn is_exported(&self) -> bool {
        self.exported
    }
}

/// Name of a generic instantiation: the base followed by the names of its
/// type arguments (`Page` + `User` is `PageUser`).
#[must_use]
pub fn compose_name(base: &str, params: &[Descriptor]) -> String {
    params.iter().fold(base.to_string(), |mut name, param| {
        name.push_str(param.name());
        name
    })
}

macro_rules! describe_basic {
    ($($ty:ty => $basic:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> Descriptor {
                    Descriptor::new::<Self>($basic.display_name(), Kind::Basic($basic))
                }
            }
        )*
    };
}

describe_basic! {
    bool => Basic::Bool,
    isize => Basic::Int,
    i8 => Basic::Int8,
    i16 => Basic::Int16,
    i32 => Basic::Int32,
    i64 => Basic::Int64,
    i128 => Basic::Int128,
    usize => Basic::Uint,
    u8 => Basic::Uint8,
    u16 => Basic::Uint16,
    u32 => Basic::Uint32,
    u64 => Basic::Uint64,
    u128 => Basic::Uint128,
    f32 => Basic::Float32,
    f64 => Basic::Float64,
    char => Basic::Char,
    String => Basic::String,
    str => Basic::String,
    &'static str => Basic::String,
    Cow<'static, str> => Basic::String,
}

macro_rules! describe_transparent {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Describe + ?Sized> Describe for $wrapper<T> {
                fn descriptor() -> Descriptor {
                    T::descriptor()
                }
            }
        )*
    };
}

describe_transparent!(Box, Rc, Arc);

impl<T: Describe> Describe for Option<T> {
    fn descriptor() -> Descriptor {
        Descriptor::new::<Self>(T::descriptor().name, Kind::Optional(T::descriptor))
    }
}

fn sequence<S: ?Sized + 'static, T: Describe + ?Sized>(suffix: &str, unique: bool) -> Descriptor {
    Descriptor::new::<S>(
        format!("{}{suffix}", T::descriptor().name),
        Kind::Sequence {
            item: T::descriptor,
            unique,
        },
    )
}

fn map<M: 'static, K: Describe, V: Describe>() -> Descriptor {
    Descriptor::new::<M>(
        format!("{}Map", V::descriptor().name),
        Kind::Map {
            key: K::descriptor,
            value: V::descriptor,
        },
    )
}

impl<T: Describe> Describe for Vec<T> {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("List", false)
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("List", false)
    }
}

impl<T: Describe> Describe for LinkedList<T> {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("List", false)
    }
}

impl<T: Describe> Describe for [T] {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("List", false)
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("List", false)
    }
}

impl<T: Describe, S: 'static> Describe for HashSet<T, S> {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("Set", true)
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("Set", true)
    }
}

impl<T: Describe, S: 'static> Describe for IndexSet<T, S> {
    fn descriptor() -> Descriptor {
        sequence::<Self, T>("Set", true)
    }
}

impl<K: Describe, V: Describe, S: 'static> Describe for HashMap<K, V, S> {
    fn descriptor() -> Descriptor {
        map::<Self, K, V>()
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn descriptor() -> Descriptor {
        map::<Self, K, V>()
    }
}

impl<K: Describe, V: Describe, S: 'static> Describe for IndexMap<K, V, S> {
    fn descriptor() -> Descriptor {
        map::<Self, K, V>()
    }
}

impl Describe for serde_json::Value {
    fn descriptor() -> Descriptor {
        Descriptor::new::<Self>("Any", Kind::Any)
    }
}

impl Describe for serde_json::Map<String, serde_json::Value> {
    fn descriptor() -> Descriptor {
        map::<Self, String, serde_json::Value>()
    }
}

macro_rules! describe_opaque {
    ($what:literal => $($ty:ty),* $(,)?) => {
        $(
            impl<T: 'static> Describe for $ty {
                fn descriptor() -> Descriptor {
                    Descriptor::new::<Self>(std::any::type_name::<Self>(), Kind::Opaque($what))
                }
            }
        )*
    };
}

describe_opaque!("channel" => mpsc::Sender<T>, mpsc::SyncSender<T>, mpsc::Receiver<T>);
describe_opaque!("function" => fn() -> T, fn(T));
