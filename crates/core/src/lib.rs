//! Core types and shared functionality for nimbus.
//!
//! This crate provides:
//! - The cache store contract and its SQLite/in-memory implementations
//! - Request identity and stored-response data model
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use cache::{CacheStore, MemoryStore, SqliteStore};
pub use config::{NavigationStrategy, WorkerConfig};
pub use error::Error;
pub use request::RequestKey;
pub use response::StoredResponse;
