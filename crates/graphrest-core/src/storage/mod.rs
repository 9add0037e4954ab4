//! # Storage Module
//!
//! Persistent `GraphStore` backends.

pub mod redb_graph;

pub use redb_graph::RedbGraph;
