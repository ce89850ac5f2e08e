//! Named, versioned cache stores.
//!
//! A store maps request identity to stored response payload. Stores are
//! addressed by name; one name corresponds to one cache generation and the
//! lifecycle manager deletes whole generations at activation time.
//!
//! Two implementations are provided:
//!
//! - [`SqliteStore`]: persistent, SQLite-backed with async access via
//!   tokio-rusqlite, WAL mode and schema migrations
//! - [`MemoryStore`]: process-local, used by tests and embedders that do
//!   not need persistence

pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod store;

pub use crate::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::CacheStore;
