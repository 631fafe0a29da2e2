//! Store interfaces and the Weaviate REST implementation.
//!
//! The store layer owns the HTTP client and knows the backend's endpoints and
//! response envelopes, nothing about tools.

pub mod weaviate;

pub use weaviate::{StoreError, StoreResult, WeaviateStore};
