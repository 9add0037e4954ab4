//! # Relationship Manager
//!
//! Creates and reads relationship resources between two node resources.
//!
//! The declaring type's schema decides how a request maps onto a stored
//! edge: an `Outgoing` relation stores `addressed -> other`, an `Incoming`
//! relation stores `other -> addressed`.

use crate::graph::GraphStore;
use crate::registry::TypeRegistry;
use crate::{Direction, GraphError, NodeRecord, PropertyMap, RelationshipId, RelationshipRecord};

/// Stateless relationship operations over any `GraphStore`.
pub struct RelationshipManager;

impl RelationshipManager {
    /// Create a relationship named `relation` between two existing nodes.
    ///
    /// `relation` must be declared on `node`'s type. When the declaration
    /// names a target type, `other` must be of that type.
    ///
    /// # Errors
    /// - `GraphError::UnknownRelation` if the relation is not declared
    /// - `GraphError::TargetMismatch` if `other` has the wrong type
    /// - `GraphError::NotFound` if the store no longer holds either node
    pub fn create<G: GraphStore + ?Sized>(
        store: &mut G,
        registry: &TypeRegistry,
        node: &NodeRecord,
        relation: &str,
        other: &NodeRecord,
        properties: PropertyMap,
    ) -> Result<RelationshipRecord, GraphError> {
        let decl = registry.relation(&node.type_name, relation).ok_or_else(|| {
            GraphError::UnknownRelation {
                type_name: node.type_name.clone(),
                relation: relation.to_string(),
            }
        })?;

        if let Some(target) = &decl.target
            && *target != other.type_name
        {
            return Err(GraphError::TargetMismatch {
                relation: relation.to_string(),
                expected: target.clone(),
                actual: other.type_name.clone(),
            });
        }

        let (start, end) = match decl.direction {
            Direction::Outgoing => (node.id, other.id),
            Direction::Incoming => (other.id, node.id),
        };

        let id = store.create_edge(start, relation, end, properties.clone())?;
        Ok(RelationshipRecord {
            id,
            relation: relation.to_string(),
            start,
            end,
            properties,
        })
    }

    /// Fetch a relationship.
    ///
    /// Fails with `GraphError::NotFound` if the store holds no such id.
    pub fn get<G: GraphStore + ?Sized>(
        store: &G,
        id: RelationshipId,
    ) -> Result<RelationshipRecord, GraphError> {
        store
            .get_edge(id)?
            .ok_or_else(|| GraphError::NotFound(format!("relationship {}", id)))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registry::{ExposedType, RelationDecl};
    use crate::{Graph, NodeId, PropertyValue};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                ExposedType::new("Person")
                    .with_properties(["name"])
                    .with_relation(RelationDecl::outgoing("friends"))
                    .with_relation(RelationDecl::outgoing("works_at").to_type("Company")),
            )
            .unwrap();
        registry
            .register(ExposedType::new("Company").with_relation(RelationDecl::incoming("employees")))
            .unwrap();
        registry
    }

    fn node(graph: &mut Graph, type_name: &str) -> NodeRecord {
        let id = graph.create_node(type_name, PropertyMap::new()).unwrap();
        graph.get_node(id).unwrap().unwrap()
    }

    #[test]
    fn create_outgoing_relationship() {
        let registry = registry();
        let mut graph = Graph::new();
        let adam = node(&mut graph, "Person");
        let bertil = node(&mut graph, "Person");

        let mut props = PropertyMap::new();
        props.insert("foo".into(), PropertyValue::from("bar"));
        let rel =
            RelationshipManager::create(&mut graph, &registry, &adam, "friends", &bertil, props)
                .unwrap();

        assert_eq!(rel.start, adam.id);
        assert_eq!(rel.end, bertil.id);
        let fetched = RelationshipManager::get(&graph, rel.id).unwrap();
        assert_eq!(fetched, rel);
    }

    #[test]
    fn incoming_relation_reverses_edge() {
        let registry = registry();
        let mut graph = Graph::new();
        let acme = node(&mut graph, "Company");
        let carl = node(&mut graph, "Person");

        let rel = RelationshipManager::create(
            &mut graph,
            &registry,
            &acme,
            "employees",
            &carl,
            PropertyMap::new(),
        )
        .unwrap();

        assert_eq!(rel.start, carl.id);
        assert_eq!(rel.end, acme.id);
    }

    #[test]
    fn undeclared_relation_rejected() {
        let registry = registry();
        let mut graph = Graph::new();
        let adam = node(&mut graph, "Person");
        let bertil = node(&mut graph, "Person");

        let result = RelationshipManager::create(
            &mut graph,
            &registry,
            &adam,
            "enemies",
            &bertil,
            PropertyMap::new(),
        );
        assert!(matches!(result, Err(GraphError::UnknownRelation { .. })));
        assert_eq!(graph.relationship_count().unwrap(), 0);
    }

    #[test]
    fn target_type_enforced() {
        let registry = registry();
        let mut graph = Graph::new();
        let adam = node(&mut graph, "Person");
        let bertil = node(&mut graph, "Person");

        let result = RelationshipManager::create(
            &mut graph,
            &registry,
            &adam,
            "works_at",
            &bertil,
            PropertyMap::new(),
        );
        assert!(matches!(result, Err(GraphError::TargetMismatch { .. })));
    }

    #[test]
    fn get_missing_relationship() {
        let graph = Graph::new();
        let result = RelationshipManager::get(&graph, RelationshipId(3));
        assert!(matches!(result, Err(GraphError::NotFound(_))));
    }

    #[test]
    fn stale_node_record_surfaces_not_found() {
        let registry = registry();
        let mut graph = Graph::new();
        let adam = node(&mut graph, "Person");
        let ghost = NodeRecord::new(NodeId(50), "Person", PropertyMap::new());

        let result = RelationshipManager::create(
            &mut graph,
            &registry,
            &adam,
            "friends",
            &ghost,
            PropertyMap::new(),
        );
        assert!(matches!(result, Err(GraphError::NotFound(_))));
    }
}
