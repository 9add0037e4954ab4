//! # Type Registry
//!
//! The table of entity types that are reachable as resources.
//!
//! A type is exposed only after it has been registered explicitly; the
//! store may well contain nodes of other types, but the adapter treats
//! them as nonexistent. Registration happens once at startup and the
//! registry is read-only afterwards.

use crate::primitives::{MAX_NAME_LENGTH, RELATIONS_SEGMENT, RESERVED_KEY_PREFIX, TRAVERSE_SEGMENT};
use crate::{Direction, GraphError};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// SCHEMA TYPES
// =============================================================================

/// A relation declared on an exposed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDecl {
    /// Relation name, used as the edge label in the store.
    pub name: String,
    /// Which end of the edge the declaring type sits on.
    pub direction: Direction,
    /// Required type of the node at the other end, if constrained.
    pub target: Option<String>,
}

impl RelationDecl {
    /// An unconstrained outgoing relation.
    #[must_use]
    pub fn outgoing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Outgoing,
            target: None,
        }
    }

    /// An unconstrained incoming relation.
    #[must_use]
    pub fn incoming(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Incoming,
            target: None,
        }
    }

    /// Restrict the other end of the relation to one type.
    #[must_use]
    pub fn to_type(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// A registered entity type: its declared properties and relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedType {
    pub name: String,
    pub properties: BTreeSet<String>,
    pub relations: BTreeMap<String, RelationDecl>,
}

impl ExposedType {
    /// An exposed type with no properties and no relations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeSet::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Declare properties.
    #[must_use]
    pub fn with_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare a relation. A later declaration with the same name replaces
    /// the earlier one.
    #[must_use]
    pub fn with_relation(mut self, relation: RelationDecl) -> Self {
        self.relations.insert(relation.name.clone(), relation);
        self
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// The set of exposed types, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, ExposedType>,
}

/// Names become path segments verbatim, so only URI-unreserved ASCII
/// (`A-Z a-z 0-9 _ . ~ -`) is allowed.
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '~' | '-')
}

fn validate_name(name: &str, owner: &str) -> Result<(), GraphError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LENGTH
        && !name.starts_with(RESERVED_KEY_PREFIX)
        && name != "."
        && name != ".."
        && name.chars().all(is_unreserved);
    if valid {
        Ok(())
    } else {
        Err(GraphError::SchemaConflict(owner.to_string()))
    }
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exposed type.
    ///
    /// Registering an identical schema twice is a no-op. Registering a
    /// differing schema under an existing name, a reserved name, or a name
    /// that cannot appear in a path fails with `GraphError::SchemaConflict`.
    pub fn register(&mut self, exposed: ExposedType) -> Result<(), GraphError> {
        validate_name(&exposed.name, &exposed.name)?;
        if exposed.name == RELATIONS_SEGMENT {
            return Err(GraphError::SchemaConflict(exposed.name));
        }
        for name in exposed.properties.iter().chain(exposed.relations.keys()) {
            validate_name(name, &exposed.name)?;
            if name == TRAVERSE_SEGMENT {
                return Err(GraphError::SchemaConflict(exposed.name));
            }
        }

        match self.types.get(&exposed.name) {
            Some(existing) if *existing == exposed => Ok(()),
            Some(_) => Err(GraphError::SchemaConflict(exposed.name)),
            None => {
                self.types.insert(exposed.name.clone(), exposed);
                Ok(())
            }
        }
    }

    /// Check whether a type has been registered.
    #[must_use]
    pub fn is_exposed(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Look up a registered type.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&ExposedType> {
        self.types.get(type_name)
    }

    /// Look up a relation declared on a type.
    #[must_use]
    pub fn relation(&self, type_name: &str, relation: &str) -> Option<&RelationDecl> {
        self.types.get(type_name)?.relations.get(relation)
    }

    /// Check whether `relation` is declared on `type_name`.
    #[must_use]
    pub fn relation_exists(&self, type_name: &str, relation: &str) -> bool {
        self.relation(type_name, relation).is_some()
    }

    /// Check whether `property` is declared on `type_name`.
    #[must_use]
    pub fn declares_property(&self, type_name: &str, property: &str) -> bool {
        self.types
            .get(type_name)
            .is_some_and(|t| t.properties.contains(property))
    }

    /// All registered types in name order.
    pub fn types(&self) -> impl Iterator<Item = &ExposedType> {
        self.types.values()
    }
}

// =============================================================================
// TESTS
// =============================================================================
