//! # Graph Store
//!
//! The collaborator interface the adapter consumes, and its in-memory
//! implementation.
//!
//! The adapter never owns record state: every read and write goes through
//! `GraphStore`. All data structures of the in-memory `Graph` use `BTreeMap`
//! for deterministic ordering.

use crate::{
    Direction, GraphError, NodeId, NodeRecord, PropertyMap, PropertyValue, RelationshipId,
    RelationshipRecord,
};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait defines the store operations the adapter relies on.
///
/// Each method is one logical store operation. Implementations are
/// responsible for id assignment and for making each mutation atomic.
///
/// All fallible operations return `Result<T, GraphError>` to support both
/// in-memory and persistent storage backends uniformly.
pub trait GraphStore {
    /// Create a node of the given type. Returns the store-assigned id.
    fn create_node(
        &mut self,
        type_name: &str,
        properties: PropertyMap,
    ) -> Result<NodeId, GraphError>;

    /// Fetch a node by id. Returns `Ok(None)` if no such node exists.
    fn get_node(&self, id: NodeId) -> Result<Option<NodeRecord>, GraphError>;

    /// Set one property on an existing node.
    ///
    /// Fails with `GraphError::NotFound` if the node does not exist.
    fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), GraphError>;

    /// Create a directed edge from `start` to `end`.
    ///
    /// Fails with `GraphError::NotFound` if either node does not exist.
    fn create_edge(
        &mut self,
        start: NodeId,
        relation: &str,
        end: NodeId,
        properties: PropertyMap,
    ) -> Result<RelationshipId, GraphError>;

    /// Fetch a relationship by id. Returns `Ok(None)` if no such edge exists.
    fn get_edge(&self, id: RelationshipId) -> Result<Option<RelationshipRecord>, GraphError>;

    /// Nodes adjacent to `id` along edges named `relation`.
    ///
    /// Ordered by edge creation. A node connected by several edges appears
    /// once per edge.
    fn neighbors(
        &self,
        id: NodeId,
        relation: &str,
        direction: Direction,
    ) -> Result<Vec<NodeId>, GraphError>;

    /// Get the total number of nodes.
    fn node_count(&self) -> Result<usize, GraphError>;

    /// Get the total number of relationships.
    fn relationship_count(&self) -> Result<usize, GraphError>;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The in-memory graph store.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
/// Ids start at 1 and increase monotonically; they are never reused.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Node storage: NodeId -> NodeRecord
    nodes: BTreeMap<NodeId, NodeRecord>,

    /// Relationship storage: RelationshipId -> RelationshipRecord
    relationships: BTreeMap<RelationshipId, RelationshipRecord>,

    /// Edges starting at a node, in creation order.
    outgoing: BTreeMap<NodeId, BTreeSet<RelationshipId>>,

    /// Edges ending at a node, in creation order.
    incoming: BTreeMap<NodeId, BTreeSet<RelationshipId>>,

    /// Next available NodeId
    next_node_id: u64,

    /// Next available RelationshipId
    next_relationship_id: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
            next_node_id: 1,
            next_relationship_id: 1,
        }
    }
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn adjacency(&self, direction: Direction) -> &BTreeMap<NodeId, BTreeSet<RelationshipId>> {
        match direction {
            Direction::Outgoing => &self.outgoing,
            Direction::Incoming => &self.incoming,
        }
    }
}

impl GraphStore for Graph {
    fn create_node(
        &mut self,
        type_name: &str,
        properties: PropertyMap,
    ) -> Result<NodeId, GraphError> {
        let node_id = NodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);

        self.nodes
            .insert(node_id, NodeRecord::new(node_id, type_name, properties));
        Ok(node_id)
    }

    fn get_node(&self, id: NodeId) -> Result<Option<NodeRecord>, GraphError> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| GraphError::NotFound(format!("node {}", id)))?;
        node.properties.insert(name.to_string(), value);
        Ok(())
    }

    fn create_edge(
        &mut self,
        start: NodeId,
        relation: &str,
        end: NodeId,
        properties: PropertyMap,
    ) -> Result<RelationshipId, GraphError> {
        for endpoint in [start, end] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(GraphError::NotFound(format!("node {}", endpoint)));
            }
        }

        let rel_id = RelationshipId(self.next_relationship_id);
        self.next_relationship_id = self.next_relationship_id.saturating_add(1);

        self.relationships.insert(
            rel_id,
            RelationshipRecord {
                id: rel_id,
                relation: relation.to_string(),
                start,
                end,
                properties,
            },
        );
        self.outgoing.entry(start).or_default().insert(rel_id);
        self.incoming.entry(end).or_default().insert(rel_id);

        Ok(rel_id)
    }

    fn get_edge(&self, id: RelationshipId) -> Result<Option<RelationshipRecord>, GraphError> {
        Ok(self.relationships.get(&id).cloned())
    }

    fn neighbors(
        &self,
        id: NodeId,
        relation: &str,
        direction: Direction,
    ) -> Result<Vec<NodeId>, GraphError> {
        let Some(edges) = self.adjacency(direction).get(&id) else {
            return Ok(Vec::new());
        };

        Ok(edges
            .iter()
            .filter_map(|rel_id| self.relationships.get(rel_id))
            .filter(|rel| rel.relation == relation)
            .map(|rel| match direction {
                Direction::Outgoing => rel.end,
                Direction::Incoming => rel.start,
            })
            .collect())
    }

    fn node_count(&self) -> Result<usize, GraphError> {
        Ok(self.nodes.len())
    }

    fn relationship_count(&self) -> Result<usize, GraphError> {
        Ok(self.relationships.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn named(name: &str) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert("name".to_string(), PropertyValue::from(name));
        props
    }

    #[test]
    fn node_ids_start_at_one_and_increase() {
        let mut graph = Graph::new();
        let a = graph.create_node("Person", PropertyMap::new()).unwrap();
        let b = graph.create_node("Person", PropertyMap::new()).unwrap();

        assert_eq!(a, NodeId(1));
        assert_eq!(b, NodeId(2));
        assert_eq!(graph.node_count().unwrap(), 2);
    }

    #[test]
    fn relationship_ids_are_independent_of_node_ids() {
        let mut graph = Graph::new();
        let a = graph.create_node("Person", PropertyMap::new()).unwrap();
        let b = graph.create_node("Person", PropertyMap::new()).unwrap();
        let c = graph.create_node("Person", PropertyMap::new()).unwrap();

        let rel = graph
            .create_edge(a, "friends", b, PropertyMap::new())
            .unwrap();
        assert_eq!(rel, RelationshipId(1));
        assert_eq!(c, NodeId(3));
    }

    #[test]
    fn get_node_returns_properties() {
        let mut graph = Graph::new();
        let id = graph.create_node("Person", named("sune")).unwrap();

        let node = graph.get_node(id).unwrap().unwrap();
        assert_eq!(node.type_name, "Person");
        assert_eq!(node.property("name"), Some(&PropertyValue::from("sune")));
        assert!(graph.get_node(NodeId(742_421)).unwrap().is_none());
    }

    #[test]
    fn set_property_overwrites() {
        let mut graph = Graph::new();
        let id = graph.create_node("Person", named("sune123")).unwrap();

        graph
            .set_property(id, "name", PropertyValue::from("new-name"))
            .unwrap();

        let node = graph.get_node(id).unwrap().unwrap();
        assert_eq!(
            node.property("name"),
            Some(&PropertyValue::from("new-name"))
        );
    }

    #[test]
    fn set_property_on_missing_node_fails() {
        let mut graph = Graph::new();
        let result = graph.set_property(NodeId(9), "name", PropertyValue::Null);
        assert!(matches!(result, Err(GraphError::NotFound(_))));
    }

    #[test]
    fn create_edge_requires_both_nodes() {
        let mut graph = Graph::new();
        let a = graph.create_node("Person", PropertyMap::new()).unwrap();

        let result = graph.create_edge(a, "friends", NodeId(99), PropertyMap::new());
        assert!(matches!(result, Err(GraphError::NotFound(_))));
        assert_eq!(graph.relationship_count().unwrap(), 0);
    }

    #[test]
    fn neighbors_follow_creation_order_and_relation_name() {
        let mut graph = Graph::new();
        let adam = graph.create_node("Person", named("adam")).unwrap();
        let bertil = graph.create_node("Person", named("bertil")).unwrap();
        let carl = graph.create_node("Person", PropertyMap::new()).unwrap();

        graph
            .create_edge(adam, "friends", carl, PropertyMap::new())
            .unwrap();
        graph
            .create_edge(adam, "enemies", bertil, PropertyMap::new())
            .unwrap();
        graph
            .create_edge(adam, "friends", bertil, PropertyMap::new())
            .unwrap();

        assert_eq!(
            graph
                .neighbors(adam, "friends", Direction::Outgoing)
                .unwrap(),
            vec![carl, bertil]
        );
        assert_eq!(
            graph
                .neighbors(bertil, "friends", Direction::Incoming)
                .unwrap(),
            vec![adam]
        );
        assert!(
            graph
                .neighbors(carl, "friends", Direction::Outgoing)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn edge_record_keeps_properties() {
        let mut graph = Graph::new();
        let a = graph.create_node("Person", PropertyMap::new()).unwrap();
        let b = graph.create_node("Person", PropertyMap::new()).unwrap();

        let mut props = PropertyMap::new();
        props.insert("foo".to_string(), PropertyValue::from("bar"));
        let rel = graph.create_edge(a, "friends", b, props).unwrap();

        let record = graph.get_edge(rel).unwrap().unwrap();
        assert_eq!(record.start, a);
        assert_eq!(record.end, b);
        assert_eq!(record.relation, "friends");
        assert_eq!(
            record.properties.get("foo"),
            Some(&PropertyValue::from("bar"))
        );
        assert!(graph.get_edge(RelationshipId(42)).unwrap().is_none());
    }
}
