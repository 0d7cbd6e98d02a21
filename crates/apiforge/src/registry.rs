//! Reference registry.
//!
//! Every struct reachable from a resolved descriptor gets exactly one named
//! schema. Entries are marked pending before their fields are synthesized, so
//! a self-referential or mutually recursive graph terminates at the first
//! revisit with a forward `$ref`.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use apiforge_core::schema::{COMPONENTS_SCHEMAS_PREFIX, Reference, Schema, SchemaRef};
use tracing::{debug, warn};

use crate::describe::{Describe, Descriptor, Kind, TypeIdentity};
use crate::error::SchemaError;
use crate::introspect::{self, Shape};
use crate::synth;

/// Highest numeric suffix tried when a name is taken by another type.
pub const MAX_NAME_SUFFIX: usize = 100;

/// Name given to anonymous structs that come without a hint.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Computes the base schema name of a struct descriptor.
pub type Namer = Box<dyn Fn(&Descriptor) -> String + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Pending,
    Complete,
}

#[derive(Debug)]
struct Entry {
    name: String,
    state: State,
}

/// Table of named schemas keyed by type identity.
///
/// Use one registry per document build. Sharing it between builders mixes
/// their component tables and name assignments.
pub struct Registry {
    prefix: String,
    namer: Option<Namer>,
    entries: HashMap<TypeIdentity, Entry>,
    names: HashMap<String, TypeIdentity>,
    schemas: BTreeMap<String, Schema>,
    /// Entries created by the resolution in progress
    created: Vec<TypeIdentity>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("prefix", &self.prefix)
            .field("custom_namer", &self.namer.is_some())
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: COMPONENTS_SCHEMAS_PREFIX.to_string(),
            namer: None,
            entries: HashMap::new(),
            names: HashMap::new(),
            schemas: BTreeMap::new(),
            created: Vec::new(),
        }
    }

    /// Use `prefix` instead of `#/components/schemas/` in references.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace the default naming (the descriptor's display name).
    /// The result is still sanitized and deduplicated.
    #[must_use]
    pub fn with_namer(
        mut self,
        namer: impl Fn(&Descriptor) -> String + Send + Sync + 'static,
    ) -> Self {
        self.namer = Some(Box::new(namer));
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve `T` into a reference (structs) or an inline schema.
    pub fn schema<T: Describe + ?Sized>(&mut self) -> Result<SchemaRef, SchemaError> {
        self.resolve(&T::descriptor(), false, None)
    }

    /// Resolve a descriptor.
    ///
    /// Structs are registered under a unique name and returned as a
    /// reference. `force_inline` only affects anonymous structs: one that
    /// reaches no other struct is returned inline without an entry. Named
    /// structs are always referenced, so a type has one representation per
    /// document. `preferred_name` names anonymous structs. On error every
    /// entry created by this call is removed again.
    pub fn resolve(
        &mut self,
        descriptor: &Descriptor,
        force_inline: bool,
        preferred_name: Option<&str>,
    ) -> Result<SchemaRef, SchemaError> {
        self.created.clear();
        let result = self.resolve_inner(descriptor, force_inline, preferred_name);
        if let Err(err) = &result {
            self.rollback(err);
        }
        self.created.clear();
        result
    }

    fn resolve_inner(
        &mut self,
        descriptor: &Descriptor,
        force_inline: bool,
        preferred_name: Option<&str>,
    ) -> Result<SchemaRef, SchemaError> {
        if let Kind::Optional(inner) = descriptor.kind() {
            return self.resolve_inner(&inner(), force_inline, preferred_name);
        }
        if !descriptor.is_struct() {
            let shape = introspect::classify(descriptor)?;
            let schema = synth::build(&shape, &mut |nested| {
                self.resolve_inner(nested, false, None)
            })?;
            return Ok(SchemaRef::inline(schema));
        }

        let identity = descriptor.identity();
        if let Some(entry) = self.entries.get(&identity) {
            match entry.state {
                State::Pending => debug!(schema = %entry.name, "cycle, emitting forward reference"),
                State::Complete => debug!(schema = %entry.name, "reusing registered schema"),
            }
            return Ok(self.ref_to(&entry.name));
        }

        let shape = introspect::classify(descriptor)?;
        if force_inline
            && descriptor.is_anonymous()
            && matches!(&shape, Shape::Object(object) if object.is_leaf())
        {
            let schema = synth::build(&shape, &mut |nested| {
                self.resolve_inner(nested, false, None)
            })?;
            return Ok(SchemaRef::inline(schema));
        }

        let named = if descriptor.is_anonymous() {
            Cow::Owned(
                descriptor
                    .clone()
                    .with_name(preferred_name.unwrap_or(ANONYMOUS_NAME)),
            )
        } else {
            Cow::Borrowed(descriptor)
        };
        let base = match &self.namer {
            Some(namer) => namer(&*named),
            None => named.name().to_string(),
        };
        let name = self.assign_name(&sanitize(&base), identity)?;

        debug!(schema = %name, type_name = identity.type_name(), "registering schema");
        self.entries.insert(
            identity,
            Entry {
                name: name.clone(),
                state: State::Pending,
            },
        );
        self.names.insert(name.clone(), identity);
        self.created.push(identity);

        let schema = synth::build(&shape, &mut |nested| {
            self.resolve_inner(nested, false, None)
        })?;

        if let Some(entry) = self.entries.get_mut(&identity) {
            entry.state = State::Complete;
        }
        self.schemas.insert(name.clone(), schema);
        Ok(self.ref_to(&name))
    }

    fn assign_name(&self, base: &str, identity: TypeIdentity) -> Result<String, SchemaError> {
        let free = |candidate: &str| {
            self.names
                .get(candidate)
                .is_none_or(|owner| *owner == identity)
        };
        if free(base) {
            return Ok(base.to_string());
        }
        (2..=MAX_NAME_SUFFIX)
            .map(|suffix| format!("{base}{suffix}"))
            .find(|candidate| free(candidate.as_str()))
            .ok_or_else(|| SchemaError::NamingCollisionUnresolvable {
                name: base.to_string(),
            })
    }

    fn rollback(&mut self, err: &SchemaError) {
        if self.created.is_empty() {
            return;
        }
        warn!(entries = self.created.len(), error = %err, "rolling back schema registration");
        for identity in self.created.drain(..) {
            if let Some(entry) = self.entries.remove(&identity) {
                self.names.remove(&entry.name);
                self.schemas.remove(&entry.name);
            }
        }
    }

    fn ref_to(&self, name: &str) -> SchemaRef {
        SchemaRef::Ref(Reference::new(format!("{}{name}", self.prefix)))
    }

    /// Registered schema by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Reference to a registered schema.
    #[must_use]
    pub fn reference(&self, name: &str) -> Option<SchemaRef> {
        self.schemas.contains_key(name).then(|| self.ref_to(name))
    }

    #[must_use]
    pub fn contains<T: Describe + ?Sized>(&self) -> bool {
        self.name_of::<T>().is_some()
    }

    /// Name under which `T` was registered.
    #[must_use]
    pub fn name_of<T: Describe + ?Sized>(&self) -> Option<&str> {
        self.entries
            .get(&TypeIdentity::of::<T>())
            .filter(|entry| entry.state == State::Complete)
            .map(|entry| entry.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered schemas in name order.
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Consume the registry into a components table.
    #[must_use]
    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}

/// Restrict a name to the characters allowed in component keys.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        ANONYMOUS_NAME.to_string()
    } else {
        sanitized
    }
}
