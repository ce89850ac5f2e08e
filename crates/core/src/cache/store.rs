//! The cache store contract.

use async_trait::async_trait;

use crate::{Error, RequestKey, StoredResponse};

/// Usage contract for a named key/value response store.
///
/// Implementations must guarantee atomic put/match/delete per key; callers
/// layer no additional locking on top. A lookup miss is `Ok(None)`, never
/// an error.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open the named store, creating it if absent.
    async fn open_or_create(&self, name: &str) -> Result<(), Error>;

    /// Store a response under the request identity, replacing any previous
    /// entry. Opens the store if it does not exist yet, mirroring the
    /// open-then-put choreography every writer follows.
    ///
    /// Only GET identities over http(s) may be stored; anything else is
    /// rejected with `Error::UnsupportedRequest`.
    async fn put(&self, name: &str, key: &RequestKey, response: StoredResponse) -> Result<(), Error>;

    /// Look up the entry for a request identity.
    async fn match_entry(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Whether an entry exists for the request identity.
    async fn contains(&self, name: &str, key: &RequestKey) -> Result<bool, Error>;

    /// Names of all stores, sorted.
    async fn list_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and all of its entries. Returns whether the store
    /// existed.
    async fn delete(&self, name: &str) -> Result<bool, Error>;
}
