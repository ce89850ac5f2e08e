//! In-memory cache store.
//!
//! Process-local store keeping every generation in a map of maps. No
//! size-based eviction: whole generations are dropped by the lifecycle
//! manager at activation, which is the only eviction this system does.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::CacheStore;
use crate::{Error, RequestKey, StoredResponse};

/// Non-persistent cache store for tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stores: RwLock<HashMap<String, HashMap<String, StoredResponse>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the named store, if it exists.
    pub async fn entry_count(&self, name: &str) -> Option<usize> {
        self.stores.read().await.get(name).map(|entries| entries.len())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open_or_create(&self, name: &str) -> Result<(), Error> {
        self.stores.write().await.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn put(&self, name: &str, key: &RequestKey, response: StoredResponse) -> Result<(), Error> {
        if !key.is_get() || !key.is_http() {
            return Err(Error::UnsupportedRequest(key.to_string()));
        }
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(key.cache_key(), response);
        Ok(())
    }

    async fn match_entry(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        Ok(self
            .stores
            .read()
            .await
            .get(name)
            .and_then(|entries| entries.get(&key.cache_key()))
            .cloned())
    }

    async fn contains(&self, name: &str, key: &RequestKey) -> Result<bool, Error> {
        Ok(self
            .stores
            .read()
            .await
            .get(name)
            .is_some_and(|entries| entries.contains_key(&key.cache_key())))
    }

    async fn list_names(&self) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        Ok(self.stores.write().await.remove(name).is_some())
    }
}
