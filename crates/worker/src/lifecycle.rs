//! Cache lifecycle: versioned install and activation.
//!
//! Install populates a brand-new cache generation from the precache
//! manifest and is atomic: entries are committed only after every manifest
//! fetch succeeded, and any failure discards the in-progress store. This
//! two-phase install/activate split means a new generation is fully
//! verified in isolation before any stale-generation data is destroyed,
//! so the system is never left without a complete usable cache.

use std::sync::Arc;

use futures::future;

use nimbus_client::NetworkFetcher;
use nimbus_core::{CacheStore, Error, RequestKey};

/// Owns cache-version naming, precache population and stale-version
/// eviction.
pub struct LifecycleManager {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn NetworkFetcher>,
    cache_version: String,
    manifest: Vec<RequestKey>,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn NetworkFetcher>,
        cache_version: String,
        manifest: Vec<RequestKey>,
    ) -> Self {
        Self { store, fetcher, cache_version, manifest }
    }

    pub fn cache_version(&self) -> &str {
        &self.cache_version
    }

    /// Populate the current generation from the precache manifest.
    ///
    /// Manifest entries are fetched concurrently with no ordering
    /// guarantee among them; only the aggregate result matters. Nothing is
    /// written until every fetch succeeded.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallIncomplete` naming every failed entry. The
    /// in-progress store is deleted first, so a failed install leaves no
    /// partially populated generation behind and the host can retry from
    /// scratch.
    pub async fn install(&self) -> Result<(), Error> {
        tracing::info!(
            cache = %self.cache_version,
            entries = self.manifest.len(),
            "install: caching app shell"
        );

        self.store.open_or_create(&self.cache_version).await?;

        let fetches = self
            .manifest
            .iter()
            .map(|key| async move { (key, self.fetcher.fetch(key, None).await) });
        let results = future::join_all(fetches).await;

        let mut staged = Vec::with_capacity(self.manifest.len());
        let mut failed = Vec::new();
        for (key, result) in results {
            match result {
                Ok(response) if response.is_success() => staged.push((key, response.to_stored())),
                Ok(response) => failed.push(format!("{} (status {})", key.url, response.status)),
                Err(err) => failed.push(format!("{} ({})", key.url, err)),
            }
        }

        if !failed.is_empty() {
            let _ = self.store.delete(&self.cache_version).await;
            return Err(Error::InstallIncomplete { failed });
        }

        for (key, stored) in staged {
            if let Err(err) = self.store.put(&self.cache_version, key, stored).await {
                let _ = self.store.delete(&self.cache_version).await;
                return Err(Error::InstallIncomplete { failed: vec![format!("{} ({})", key.url, err)] });
            }
        }

        tracing::info!(cache = %self.cache_version, "install complete; skipping waiting phase");
        Ok(())
    }

    /// Make the current generation the only one.
    ///
    /// Deletes every store whose name differs from the current cache
    /// version, then signals that this version takes control of in-flight
    /// consumers immediately.
    pub async fn activate(&self) -> Result<(), Error> {
        tracing::info!(cache = %self.cache_version, "activate");

        for name in self.store.list_names().await? {
            if name != self.cache_version {
                tracing::info!(cache = %name, "deleting old cache");
                self.store.delete(&name).await?;
            }
        }

        tracing::info!("claiming clients");
        Ok(())
    }
}
