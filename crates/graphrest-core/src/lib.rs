//! # graphrest-core
//!
//! The graph-resource adapter logic: everything needed to serve graph-store
//! nodes and relationships as addressable resources, minus the socket.
//!
//! ## Layout
//!
//! - `addressing` → (type, id) ↔ URI
//! - `registry` → which types are exposed, with their properties and relations
//! - `codec` → property map ↔ flat JSON object
//! - `relationships` → relationship create/read
//! - `traversal` → bounded breadth-first walk along one relation
//! - `graph`, `storage`, `session` → the `GraphStore` collaborator and its backends
//!
//! ## Architectural Constraints
//!
//! - The adapter holds no record state; the store owns ids and records
//! - Has NO async, NO network dependencies (pure Rust)
//! - Every operation is one logical store call and safe to run concurrently
//!   behind the caller's lock

// =============================================================================
// MODULES
// =============================================================================

pub mod addressing;
pub mod codec;
pub mod graph;
pub mod primitives;
pub mod registry;
pub mod relationships;
pub mod session;
pub mod storage;
pub mod traversal;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Direction, GraphError, NodeId, NodeRecord, PropertyMap, PropertyValue, RelationshipId,
    RelationshipRecord,
};

// =============================================================================
// RE-EXPORTS: Adapter Components
// =============================================================================

pub use addressing::{Addressing, ResourcePath};
pub use codec::PropertyCodec;
pub use graph::{Graph, GraphStore};
pub use registry::{ExposedType, RelationDecl, TypeRegistry};
pub use relationships::RelationshipManager;
pub use session::{Session, StorageBackend};
pub use storage::RedbGraph;
pub use traversal::TraversalExecutor;
