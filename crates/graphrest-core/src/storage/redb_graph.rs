//! # redb-backed Graph Storage
//!
//! A disk-backed graph store using the redb embedded database.
//!
//! Every mutating `GraphStore` call runs in exactly one write transaction,
//! so a request either commits fully or leaves nothing behind:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Records are encoded with postcard. Adjacency is kept in two tables keyed
//! by `(node_id, relationship_id)`, so a range scan over one node yields its
//! edges in creation order.

use crate::graph::GraphStore;
use crate::{
    Direction, GraphError, NodeId, NodeRecord, PropertyMap, PropertyValue, RelationshipId,
    RelationshipRecord,
};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Table for nodes: NodeId(u64) -> serialized NodeRecord bytes
const NODES: TableDefinition<u64, &[u8]> = TableDefinition::new("nodes");

/// Table for relationships: RelationshipId(u64) -> serialized RelationshipRecord bytes
const RELATIONSHIPS: TableDefinition<u64, &[u8]> = TableDefinition::new("relationships");

/// Outgoing adjacency: (start_id, rel_id) -> end_id
const OUTGOING: TableDefinition<(u64, u64), u64> = TableDefinition::new("outgoing");

/// Incoming adjacency: (end_id, rel_id) -> start_id
const INCOMING: TableDefinition<(u64, u64), u64> = TableDefinition::new("incoming");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_NODE_ID: &str = "next_node_id";
const NEXT_RELATIONSHIP_ID: &str = "next_relationship_id";

fn storage(e: impl std::fmt::Display) -> GraphError {
    GraphError::Storage(e.to_string())
}

fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, GraphError> {
    postcard::to_allocvec(record).map_err(|e| GraphError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GraphError> {
    postcard::from_bytes(bytes).map_err(|e| GraphError::Serialization(e.to_string()))
}

/// A disk-backed graph store using redb.
///
/// Id counters are cached in memory and written through to the metadata
/// table inside the same transaction that consumes them.
pub struct RedbGraph {
    /// The redb database handle.
    db: Database,
    /// Next available node ID.
    next_node_id: u64,
    /// Next available relationship ID.
    next_relationship_id: u64,
}

impl std::fmt::Debug for RedbGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbGraph")
            .field("next_node_id", &self.next_node_id)
            .field("next_relationship_id", &self.next_relationship_id)
            .finish_non_exhaustive()
    }
}

impl RedbGraph {
    /// Open or create a graph database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let db = Database::create(path.as_ref()).map_err(storage)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage)?;
            let _ = write_txn.open_table(NODES).map_err(storage)?;
            let _ = write_txn.open_table(RELATIONSHIPS).map_err(storage)?;
            let _ = write_txn.open_table(OUTGOING).map_err(storage)?;
            let _ = write_txn.open_table(INCOMING).map_err(storage)?;
            let _ = write_txn.open_table(METADATA).map_err(storage)?;
            write_txn.commit().map_err(storage)?;
        }

        let read_txn = db.begin_read().map_err(storage)?;
        let (next_node_id, next_relationship_id) = {
            let table = read_txn.open_table(METADATA).map_err(storage)?;
            let node = table
                .get(NEXT_NODE_ID)
                .map_err(storage)?
                .map(|v| v.value())
                .unwrap_or(1);
            let rel = table
                .get(NEXT_RELATIONSHIP_ID)
                .map_err(storage)?
                .map(|v| v.value())
                .unwrap_or(1);
            (node, rel)
        };

        Ok(Self {
            db,
            next_node_id,
            next_relationship_id,
        })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), GraphError> {
        self.db.compact().map_err(storage)?;
        Ok(())
    }
}

// =============================================================================
// GRAPHSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl GraphStore for RedbGraph {
    fn create_node(
        &mut self,
        type_name: &str,
        properties: PropertyMap,
    ) -> Result<NodeId, GraphError> {
        let node_id = NodeId(self.next_node_id);
        let next = self.next_node_id.saturating_add(1);
        let bytes = encode(&NodeRecord::new(node_id, type_name, properties))?;

        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut nodes = write_txn.open_table(NODES).map_err(storage)?;
            nodes
                .insert(node_id.0, bytes.as_slice())
                .map_err(storage)?;
            let mut meta = write_txn.open_table(METADATA).map_err(storage)?;
            meta.insert(NEXT_NODE_ID, next).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        // Update in-memory state only after successful commit.
        self.next_node_id = next;
        Ok(node_id)
    }

    fn get_node(&self, id: NodeId) -> Result<Option<NodeRecord>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let nodes = read_txn.open_table(NODES).map_err(storage)?;

        match nodes.get(id.0).map_err(storage)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), GraphError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut nodes = write_txn.open_table(NODES).map_err(storage)?;
            let mut node: NodeRecord = match nodes.get(id.0).map_err(storage)? {
                Some(data) => decode(data.value())?,
                None => return Err(GraphError::NotFound(format!("node {}", id))),
            };
            node.properties.insert(name.to_string(), value);
            let bytes = encode(&node)?;
            nodes.insert(id.0, bytes.as_slice()).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn create_edge(
        &mut self,
        start: NodeId,
        relation: &str,
        end: NodeId,
        properties: PropertyMap,
    ) -> Result<RelationshipId, GraphError> {
        let rel_id = RelationshipId(self.next_relationship_id);
        let next = self.next_relationship_id.saturating_add(1);
        let bytes = encode(&RelationshipRecord {
            id: rel_id,
            relation: relation.to_string(),
            start,
            end,
            properties,
        })?;

        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            // Both endpoints must exist within the same transaction.
            let nodes = write_txn.open_table(NODES).map_err(storage)?;
            for endpoint in [start, end] {
                if nodes.get(endpoint.0).map_err(storage)?.is_none() {
                    return Err(GraphError::NotFound(format!("node {}", endpoint)));
                }
            }

            let mut rels = write_txn.open_table(RELATIONSHIPS).map_err(storage)?;
            rels.insert(rel_id.0, bytes.as_slice()).map_err(storage)?;
            let mut outgoing = write_txn.open_table(OUTGOING).map_err(storage)?;
            outgoing
                .insert((start.0, rel_id.0), end.0)
                .map_err(storage)?;
            let mut incoming = write_txn.open_table(INCOMING).map_err(storage)?;
            incoming
                .insert((end.0, rel_id.0), start.0)
                .map_err(storage)?;
            let mut meta = write_txn.open_table(METADATA).map_err(storage)?;
            meta.insert(NEXT_RELATIONSHIP_ID, next).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        self.next_relationship_id = next;
        Ok(rel_id)
    }

    fn get_edge(&self, id: RelationshipId) -> Result<Option<RelationshipRecord>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let rels = read_txn.open_table(RELATIONSHIPS).map_err(storage)?;

        match rels.get(id.0).map_err(storage)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn neighbors(
        &self,
        id: NodeId,
        relation: &str,
        direction: Direction,
    ) -> Result<Vec<NodeId>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let adjacency = match direction {
            Direction::Outgoing => read_txn.open_table(OUTGOING),
            Direction::Incoming => read_txn.open_table(INCOMING),
        }
        .map_err(storage)?;
        let rels = read_txn.open_table(RELATIONSHIPS).map_err(storage)?;

        let mut neighbors = Vec::new();
        for entry in adjacency
            .range((id.0, 0u64)..=(id.0, u64::MAX))
            .map_err(storage)?
        {
            let (key, other) = entry.map_err(storage)?;
            let (_node_id, rel_id) = key.value();
            let Some(data) = rels.get(rel_id).map_err(storage)? else {
                continue;
            };
            let record: RelationshipRecord = decode(data.value())?;
            if record.relation == relation {
                neighbors.push(NodeId(other.value()));
            }
        }
        Ok(neighbors)
    }

    fn node_count(&self) -> Result<usize, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let nodes = read_txn.open_table(NODES).map_err(storage)?;
        Ok(nodes.len().map_err(storage)? as usize)
    }

    fn relationship_count(&self) -> Result<usize, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let rels = read_txn.open_table(RELATIONSHIPS).map_err(storage)?;
        Ok(rels.len().map_err(storage)? as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
