//! # graphrest
//!
//! Serves graph-store nodes and relationships as HTTP resources.
//!
//! - `config` → TOML server settings and the exposed-type schema
//! - `api` → the resource dispatcher and the axum serving component
//! - `error` → startup and CLI failures

pub mod api;
pub mod config;
pub mod error;
