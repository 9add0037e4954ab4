//! # Entity Addressing
//!
//! Pure mapping between store identities and resource URIs.
//!
//! ```text
//! /<TypeName>                 collection of a type
//! /<TypeName>/<id>            one node
//! /<TypeName>/<id>/<name>     property, relation or traversal of a node
//! /Relations/<id>             one relationship
//! ```
//!
//! Generated URIs are always absolute: they are prefixed with the base
//! supplied by the serving component. `Location` headers use the relative
//! path form.

use crate::primitives::RELATIONS_SEGMENT;
use crate::{GraphError, NodeId, RelationshipId};

/// A parsed resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePath {
    /// `/<TypeName>`
    Collection { type_name: String },
    /// `/<TypeName>/<id>`
    Entity { type_name: String, id: NodeId },
    /// `/<TypeName>/<id>/<name>`
    SubResource {
        type_name: String,
        id: NodeId,
        name: String,
    },
    /// `/Relations/<id>`
    Relationship { id: RelationshipId },
}

impl ResourcePath {
    /// The entity type the path addresses, if it addresses a node or collection.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Collection { type_name }
            | Self::Entity { type_name, .. }
            | Self::SubResource { type_name, .. } => Some(type_name),
            Self::Relationship { .. } => None,
        }
    }
}

/// Builds and resolves URIs under one externally visible base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    base: String,
}

fn malformed(path: &str) -> GraphError {
    GraphError::Addressing(path.to_string())
}

/// Parse an id segment. Only plain decimal digits are accepted.
fn parse_id(segment: &str, path: &str) -> Result<u64, GraphError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(path));
    }
    segment.parse().map_err(|_| malformed(path))
}

impl Addressing {
    /// Create an addressing scheme for the given base, e.g. `http://0.0.0.0:4567`.
    ///
    /// The base must be absolute (carry a scheme). A trailing slash is dropped.
    pub fn new(base: impl Into<String>) -> Result<Self, GraphError> {
        let base = base.into();
        let trimmed = base.trim_end_matches('/');
        match trimmed.split_once("://") {
            Some((scheme, authority)) if !scheme.is_empty() && !authority.is_empty() => {
                Ok(Self {
                    base: trimmed.to_string(),
                })
            }
            _ => Err(GraphError::Addressing(base)),
        }
    }

    /// The base all generated URIs start with.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URI of a node: `<base>/<type_name>/<id>`.
    #[must_use]
    pub fn uri_for(&self, type_name: &str, id: NodeId) -> String {
        format!("{}{}", self.base, Self::path_for(type_name, id))
    }

    /// Absolute URI of a relationship: `<base>/Relations/<id>`.
    #[must_use]
    pub fn uri_for_relationship(&self, id: RelationshipId) -> String {
        format!("{}{}", self.base, Self::relationship_path(id))
    }

    /// Relative path of a node, as used in `Location` headers.
    #[must_use]
    pub fn path_for(type_name: &str, id: NodeId) -> String {
        format!("/{}/{}", type_name, id)
    }

    /// Relative path of a relationship, as used in `Location` headers.
    #[must_use]
    pub fn relationship_path(id: RelationshipId) -> String {
        format!("/{}/{}", RELATIONS_SEGMENT, id)
    }

    /// Parse a request path into a resource address.
    ///
    /// Fails with `GraphError::Addressing` when the path has no recognised
    /// shape or an id segment is not a non-negative integer.
    pub fn parse_path(path: &str) -> Result<ResourcePath, GraphError> {
        let rest = path.strip_prefix('/').ok_or_else(|| malformed(path))?;
        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(malformed(path));
        }

        match segments.as_slice() {
            [RELATIONS_SEGMENT, id] => Ok(ResourcePath::Relationship {
                id: RelationshipId(parse_id(id, path)?),
            }),
            [RELATIONS_SEGMENT, ..] => Err(malformed(path)),
            [type_name] => Ok(ResourcePath::Collection {
                type_name: (*type_name).to_string(),
            }),
            [type_name, id] => Ok(ResourcePath::Entity {
                type_name: (*type_name).to_string(),
                id: NodeId(parse_id(id, path)?),
            }),
            [type_name, id, name] => Ok(ResourcePath::SubResource {
                type_name: (*type_name).to_string(),
                id: NodeId(parse_id(id, path)?),
                name: (*name).to_string(),
            }),
            _ => Err(malformed(path)),
        }
    }

    /// Resolve a URI supplied in a request body.
    ///
    /// Accepts an absolute URI under this base or a relative path. URIs that
    /// point at another host are rejected as malformed.
    pub fn resolve_uri(&self, uri: &str) -> Result<ResourcePath, GraphError> {
        if let Some(path) = uri.strip_prefix(self.base.as_str())
            && path.starts_with('/')
        {
            return Self::parse_path(path);
        }
        if uri.starts_with('/') {
            return Self::parse_path(uri);
        }
        Err(malformed(uri))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn addressing() -> Addressing {
        Addressing::new("http://0.0.0.0:4567").unwrap()
    }

    #[test]
    fn uri_for_node() {
        assert_eq!(
            addressing().uri_for("Person", NodeId(1)),
            "http://0.0.0.0:4567/Person/1"
        );
    }

    #[test]
    fn uri_for_relationship() {
        assert_eq!(
            addressing().uri_for_relationship(RelationshipId(2)),
            "http://0.0.0.0:4567/Relations/2"
        );
        assert_eq!(
            Addressing::relationship_path(RelationshipId(2)),
            "/Relations/2"
        );
    }

    #[test]
    fn base_trailing_slash_dropped() {
        let addr = Addressing::new("http://example.org:8080/").unwrap();
        assert_eq!(addr.base(), "http://example.org:8080");
        assert_eq!(
            addr.uri_for("Person", NodeId(3)),
            "http://example.org:8080/Person/3"
        );
    }

    #[test]
    fn relative_base_rejected() {
        assert!(matches!(
            Addressing::new("localhost:8080"),
            Err(GraphError::Addressing(_))
        ));
        assert!(Addressing::new("http://").is_err());
    }

    #[test]
    fn parse_all_shapes() {
        assert_eq!(
            Addressing::parse_path("/Person").unwrap(),
            ResourcePath::Collection {
                type_name: "Person".into()
            }
        );
        assert_eq!(
            Addressing::parse_path("/Person/12").unwrap(),
            ResourcePath::Entity {
                type_name: "Person".into(),
                id: NodeId(12)
            }
        );
        assert_eq!(
            Addressing::parse_path("/Person/12/name").unwrap(),
            ResourcePath::SubResource {
                type_name: "Person".into(),
                id: NodeId(12),
                name: "name".into()
            }
        );
        assert_eq!(
            Addressing::parse_path("/Relations/4").unwrap(),
            ResourcePath::Relationship {
                id: RelationshipId(4)
            }
        );
    }

    #[test]
    fn malformed_paths_rejected() {
        for path in [
            "",
            "/",
            "Person/1",
            "/Person/",
            "/Person//name",
            "/Person/abc",
            "/Person/-1",
            "/Person/+1",
            "/Person/1/name/extra",
            "/Person/99999999999999999999999",
            "/Relations",
            "/Relations/x",
            "/Relations/1/foo",
        ] {
            assert!(
                matches!(Addressing::parse_path(path), Err(GraphError::Addressing(_))),
                "accepted {path:?}"
            );
        }
    }

    #[test]
    fn resolve_absolute_and_relative() {
        let addr = addressing();
        let expected = ResourcePath::Entity {
            type_name: "Person".into(),
            id: NodeId(2),
        };
        assert_eq!(
            addr.resolve_uri("http://0.0.0.0:4567/Person/2").unwrap(),
            expected
        );
        assert_eq!(addr.resolve_uri("/Person/2").unwrap(), expected);
    }

    #[test]
    fn resolve_foreign_host_rejected() {
        let addr = addressing();
        assert!(addr.resolve_uri("http://elsewhere:4567/Person/2").is_err());
        assert!(addr.resolve_uri("http://0.0.0.0:45678/Person/2").is_err());
        assert!(addr.resolve_uri("Person/2").is_err());
    }

    #[test]
    fn type_name_of_path() {
        let rel = ResourcePath::Relationship {
            id: RelationshipId(1),
        };
        assert_eq!(rel.type_name(), None);
        let node = Addressing::parse_path("/Person/1/name").unwrap();
        assert_eq!(node.type_name(), Some("Person"));
    }
}
