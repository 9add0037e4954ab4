//! # Core Type Definitions
//!
//! This module contains the record types shared by every layer of the adapter:
//! - Store identifiers (`NodeId`, `RelationshipId`)
//! - Scalar property values (`PropertyValue`, `PropertyMap`)
//! - Store records (`NodeRecord`, `RelationshipRecord`)
//! - Edge direction (`Direction`)
//! - Error types (`GraphError`)
//!
//! ## Identity
//!
//! Node ids and relationship ids live in two disjoint id spaces. Both are
//! assigned by the store at creation time and never reused, so a record's
//! URI is a pure function of its id (and, for nodes, its type name).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// STORE IDENTIFIERS
// =============================================================================

/// Store-assigned identifier of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Store-assigned identifier of a relationship.
///
/// Relationship ids are numbered independently of node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// PROPERTY VALUES
// =============================================================================

/// A scalar property value.
///
/// Only flat scalars are stored. Nested objects and arrays are rejected
/// at the codec boundary before they ever reach the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Integers above `i64::MAX`. Variant order is part of the stored encoding.
    UInt(u64),
}

impl PropertyValue {
    /// Borrow the value as a string slice, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Property name -> value. Ordered for deterministic encoding.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

// =============================================================================
// RECORDS
// =============================================================================

/// A node as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Store-assigned id.
    pub id: NodeId,
    /// Name of the exposed type this node is an instance of.
    pub type_name: String,
    /// Current property values. Unset properties are absent.
    pub properties: PropertyMap,
}

impl NodeRecord {
    /// Create a new node record.
    #[must_use]
    pub fn new(id: NodeId, type_name: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            properties,
        }
    }

    /// Get a single property value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// A directed, named edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Store-assigned id.
    pub id: RelationshipId,
    /// Relation name (e.g. `friends`).
    pub relation: String,
    /// Node the edge starts at.
    pub start: NodeId,
    /// Node the edge points to.
    pub end: NodeId,
    /// Properties carried by the edge.
    pub properties: PropertyMap,
}

/// Which end of an edge a relation is followed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow edges that start at the node.
    #[default]
    Outgoing,
    /// Follow edges that end at the node.
    Incoming,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while serving a resource request.
///
/// - No silent failures
/// - Every variant is terminal for the request that raised it
/// - The HTTP layer maps each variant onto exactly one status code
#[derive(Debug, Error)]
pub enum GraphError {
    /// The request path does not have a recognised resource shape.
    #[error("Malformed resource path: {0}")]
    Addressing(String),

    /// A type was registered twice with differing schemas, or under a reserved name.
    #[error("Schema conflict for type '{0}'")]
    SchemaConflict(String),

    /// The addressed node or relationship does not exist in the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request body is not valid JSON or does not have the expected shape.
    #[error("Malformed body: {0}")]
    MalformedBody(String),

    /// The relation is not declared on the node's type.
    #[error("Unknown relation '{relation}' on type '{type_name}'")]
    UnknownRelation { type_name: String, relation: String },

    /// A property write names a property the type does not declare.
    #[error("Undeclared property '{property}' on type '{type_name}'")]
    UndeclaredProperty { type_name: String, property: String },

    /// The end node of a relationship is not of the relation's target type.
    #[error("Relation '{relation}' expects target type '{expected}', got '{actual}'")]
    TargetMismatch {
        relation: String,
        expected: String,
        actual: String,
    },

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The storage engine reported a failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

// =============================================================================
// TESTS
// =============================================================================
