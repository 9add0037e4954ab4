//! # Property-Based Tests
//!
//! Addressing and traversal invariants checked with proptest.

use graphrest_core::{
    Addressing, ExposedType, Graph, GraphStore, NodeId, PropertyMap, RelationDecl, ResourcePath,
    TraversalExecutor, TypeRegistry,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn person_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(ExposedType::new("Person").with_relation(RelationDecl::outgoing("friends")))
        .expect("register");
    registry
}

/// Build a graph of `count` Person nodes with the given `friends` edges.
fn build_graph(count: usize, edges: &[(usize, usize)]) -> (Graph, Vec<NodeId>) {
    let mut graph = Graph::new();
    let nodes: Vec<NodeId> = (0..count)
        .map(|_| graph.create_node("Person", PropertyMap::new()).expect("node"))
        .collect();
    for &(from, to) in edges {
        graph
            .create_edge(
                nodes[from % count],
                "friends",
                nodes[to % count],
                PropertyMap::new(),
            )
            .expect("edge");
    }
    (graph, nodes)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Parsing a generated URI yields the type and id it was built from.
    #[test]
    fn uri_round_trip(type_name in "[A-Z][A-Za-z0-9]{0,15}", id in any::<u64>()) {
        prop_assume!(type_name != "Relations");
        let addressing = Addressing::new("http://0.0.0.0:4567").expect("base");

        let uri = addressing.uri_for(&type_name, NodeId(id));
        let parsed = addressing.resolve_uri(&uri).expect("resolve");

        prop_assert_eq!(parsed, ResourcePath::Entity { type_name, id: NodeId(id) });
    }

    /// Relative node paths parse back to the same address.
    #[test]
    fn path_round_trip(type_name in "[a-z][a-z_]{0,10}", id in any::<u64>()) {
        let path = Addressing::path_for(&type_name, NodeId(id));
        let parsed = Addressing::parse_path(&path).expect("parse");

        prop_assert_eq!(parsed.type_name(), Some(type_name.as_str()));
    }

    /// Non-numeric id segments are rejected, never treated as not found.
    #[test]
    fn non_numeric_ids_rejected(id in "[a-zA-Z_-][a-zA-Z0-9_-]{0,8}") {
        let path = format!("/Person/{}", id);
        prop_assert!(Addressing::parse_path(&path).is_err());
    }

    /// Traversal never yields the start node and never repeats a node.
    #[test]
    fn traversal_unique_and_excludes_start(
        count in 1usize..15,
        edges in vec((0usize..15, 0usize..15), 0..60),
        depth in 0usize..8,
    ) {
        let (graph, nodes) = build_graph(count, &edges);
        let registry = person_registry();
        let start = graph.get_node(nodes[0]).expect("get").expect("present");

        let reached = TraversalExecutor::traverse(&graph, &registry, &start, "friends", depth)
            .expect("traverse");

        let unique: BTreeSet<_> = reached.iter().map(|n| n.id).collect();
        prop_assert_eq!(unique.len(), reached.len());
        prop_assert!(!unique.contains(&start.id));
        prop_assert!(reached.len() < count.max(1));
    }

    /// Depth zero yields nothing, whatever the graph looks like.
    #[test]
    fn depth_zero_always_empty(
        count in 1usize..10,
        edges in vec((0usize..10, 0usize..10), 0..30),
    ) {
        let (graph, nodes) = build_graph(count, &edges);
        let start = graph.get_node(nodes[0]).expect("get").expect("present");

        let reached = TraversalExecutor::traverse(&graph, &person_registry(), &start, "friends", 0)
            .expect("traverse");
        prop_assert!(reached.is_empty());
    }

    /// A deeper walk only ever extends a shallower one.
    #[test]
    fn deeper_traversal_extends_prefix(
        count in 1usize..12,
        edges in vec((0usize..12, 0usize..12), 0..40),
        depth in 0usize..5,
    ) {
        let (graph, nodes) = build_graph(count, &edges);
        let registry = person_registry();
        let start = graph.get_node(nodes[0]).expect("get").expect("present");

        let shallow = TraversalExecutor::traverse(&graph, &registry, &start, "friends", depth)
            .expect("traverse");
        let deep = TraversalExecutor::traverse(&graph, &registry, &start, "friends", depth + 1)
            .expect("traverse");

        prop_assert!(deep.len() >= shallow.len());
        prop_assert_eq!(&deep[..shallow.len()], &shallow[..]);
    }
}
