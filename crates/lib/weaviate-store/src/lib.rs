//! Wire models and schema helpers for weaviate-mcp.
//!
//! This crate defines the record types passed between the tool dispatcher,
//! the backend bridge, and the Weaviate REST API.

pub mod models;
pub mod schema;

pub use models::*;
