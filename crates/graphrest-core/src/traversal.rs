//! # Traversal Executor
//!
//! Bounded breadth-first walk along one named relation.
//!
//! - Nodes are yielded in the order their connecting edge was discovered
//! - The start node is never part of the result
//! - Each node appears at most once, so cyclic graphs terminate
//! - Nodes of types that are not exposed are neither yielded nor expanded
//!
//! The visited set lives only for the duration of one call.

use crate::graph::GraphStore;
use crate::primitives::MAX_TRAVERSAL_DEPTH;
use crate::registry::TypeRegistry;
use crate::{GraphError, NodeRecord};
use std::collections::{BTreeSet, VecDeque};

/// Stateless traversal over any `GraphStore`.
pub struct TraversalExecutor;

impl TraversalExecutor {
    /// Walk `relation` from `start` for at most `max_depth` hops.
    ///
    /// The relation's direction is taken from its declaration on the start
    /// node's type and applied at every hop. `max_depth = 0` yields nothing;
    /// depths above `MAX_TRAVERSAL_DEPTH` are clamped.
    ///
    /// Fails with `GraphError::UnknownRelation` if `relation` is not declared
    /// on the start node's type.
    pub fn traverse<G: GraphStore + ?Sized>(
        store: &G,
        registry: &TypeRegistry,
        start: &NodeRecord,
        relation: &str,
        max_depth: usize,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        let decl = registry.relation(&start.type_name, relation).ok_or_else(|| {
            GraphError::UnknownRelation {
                type_name: start.type_name.clone(),
                relation: relation.to_string(),
            }
        })?;
        let max_depth = max_depth.min(MAX_TRAVERSAL_DEPTH);

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        let mut reached = Vec::new();

        visited.insert(start.id);
        queue.push_back((start.id, 0usize));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            for neighbor in store.neighbors(current, relation, decl.direction)? {
                if !visited.insert(neighbor) {
                    continue;
                }
                let Some(node) = store.get_node(neighbor)? else {
                    continue;
                };
                if !registry.is_exposed(&node.type_name) {
                    continue;
                }
                queue.push_back((neighbor, depth.saturating_add(1)));
                reached.push(node);
            }
        }

        Ok(reached)
    }
}

// =============================================================================
// TESTS
// =============================================================================
