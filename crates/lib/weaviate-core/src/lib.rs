//! Core types and services for weaviate-mcp.
//!
//! This crate owns the connection descriptor, the HTTP client for the Weaviate
//! REST API, the backend bridge that turns domain requests into backend calls,
//! and the dispatcher that validates untyped tool arguments before handing
//! them to the bridge.

pub mod bridge;
pub mod catalog;
pub mod connection;
pub mod dispatch;
pub mod store;
