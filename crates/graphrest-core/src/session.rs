//! # Session Module
//!
//! A `Session` is the store handle the serving component hands to the
//! adapter. It hides which backend is in use behind `GraphStore`.
//!
//! ## Storage Backends
//!
//! - `InMemory`: Uses in-memory `Graph` (fast, volatile)
//! - `Persistent`: Uses `RedbGraph` for disk-backed ACID storage

use crate::graph::{Graph, GraphStore};
use crate::storage::RedbGraph;
use crate::{
    Direction, GraphError, NodeId, NodeRecord, PropertyMap, PropertyValue, RelationshipId,
    RelationshipRecord,
};
use std::path::Path;

/// Storage backend for a Session.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory graph (fast, volatile).
    InMemory(Graph),
    /// Disk-backed graph using redb (ACID, persistent).
    Persistent(RedbGraph),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(Graph::new())
    }
}

// NOTE: Session does NOT implement Clone.
// RedbGraph (database handle) cannot be safely cloned; share it behind a lock.

/// The store handle used by the adapter.
#[derive(Debug, Default)]
pub struct Session {
    backend: StorageBackend,
}

impl Session {
    /// Create a new empty session with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session over an existing in-memory graph.
    #[must_use]
    pub fn with_graph(graph: Graph) -> Self {
        Self {
            backend: StorageBackend::InMemory(graph),
        }
    }

    /// Create a session with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    /// All changes are persisted as they are made.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let redb = RedbGraph::open(path)?;
        Ok(Self {
            backend: StorageBackend::Persistent(redb),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// Reclaim free space in the database file. No-op for in-memory storage.
    pub fn compact(&mut self) -> Result<(), GraphError> {
        match &mut self.backend {
            StorageBackend::InMemory(_) => Ok(()),
            StorageBackend::Persistent(r) => r.compact(),
        }
    }

    fn store(&self) -> &dyn GraphStore {
        match &self.backend {
            StorageBackend::InMemory(g) => g,
            StorageBackend::Persistent(r) => r,
        }
    }

    fn store_mut(&mut self) -> &mut dyn GraphStore {
        match &mut self.backend {
            StorageBackend::InMemory(g) => g,
            StorageBackend::Persistent(r) => r,
        }
    }
}

impl GraphStore for Session {
    fn create_node(
        &mut self,
        type_name: &str,
        properties: PropertyMap,
    ) -> Result<NodeId, GraphError> {
        self.store_mut().create_node(type_name, properties)
    }

    fn get_node(&self, id: NodeId) -> Result<Option<NodeRecord>, GraphError> {
        self.store().get_node(id)
    }

    fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), GraphError> {
        self.store_mut().set_property(id, name, value)
    }

    fn create_edge(
        &mut self,
        start: NodeId,
        relation: &str,
        end: NodeId,
        properties: PropertyMap,
    ) -> Result<RelationshipId, GraphError> {
        self.store_mut()
            .create_edge(start, relation, end, properties)
    }

    fn get_edge(&self, id: RelationshipId) -> Result<Option<RelationshipRecord>, GraphError> {
        self.store().get_edge(id)
    }

    fn neighbors(
        &self,
        id: NodeId,
        relation: &str,
        direction: Direction,
    ) -> Result<Vec<NodeId>, GraphError> {
        self.store().neighbors(id, relation, direction)
    }

    fn node_count(&self) -> Result<usize, GraphError> {
        self.store().node_count()
    }

    fn relationship_count(&self) -> Result<usize, GraphError> {
        self.store().relationship_count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
