//! The interception gateway.
//!
//! [`ServiceWorker`] is the engine's entry point: one method per host
//! lifecycle trigger (install, activate, fetch-intercept). All routing
//! configuration and both collaborators (store, fetcher) are passed in at
//! construction; nothing is process-global. Every intercepted request is
//! dispatched to exactly one strategy executor and produces exactly one
//! response.

use std::sync::Arc;

use tokio::sync::Mutex;

use nimbus_client::NetworkFetcher;
use nimbus_core::{CacheStore, Error, RequestKey, WorkerConfig};

use crate::lifecycle::LifecycleManager;
use crate::routes::{self, RouteRules, Strategy};
use crate::strategies::{self, ExecutorContext, ServedResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecyclePhase {
    Idle,
    Installed,
    Active,
}

/// The offline worker: gateway plus lifecycle, wired to a store and a
/// network fetcher.
pub struct ServiceWorker {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn NetworkFetcher>,
    rules: RouteRules,
    lifecycle: LifecycleManager,
    cache_version: String,
    offline_fallback: RequestKey,
    phase: Mutex<LifecyclePhase>,
}

impl ServiceWorker {
    /// Build a worker from configuration and collaborators.
    ///
    /// Resolves the precache manifest and the offline fallback against
    /// the configured origin.
    pub fn new(
        config: &WorkerConfig,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn NetworkFetcher>,
    ) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;

        let manifest = config
            .precache_manifest
            .iter()
            .map(|identity| RequestKey::resolve(&origin, identity))
            .collect::<Result<Vec<_>, _>>()?;
        let offline_fallback = RequestKey::resolve(&origin, &config.offline_fallback)?;

        let lifecycle = LifecycleManager::new(
            Arc::clone(&store),
            Arc::clone(&fetcher),
            config.cache_version.clone(),
            manifest,
        );

        Ok(Self {
            rules: RouteRules::from_config(config),
            store,
            fetcher,
            lifecycle,
            cache_version: config.cache_version.clone(),
            offline_fallback,
            phase: Mutex::new(LifecyclePhase::Idle),
        })
    }

    /// Name of the current cache generation.
    pub fn cache_version(&self) -> &str {
        &self.cache_version
    }

    /// Install trigger: precache the app shell.
    pub async fn on_install(&self) -> Result<(), Error> {
        self.lifecycle.install().await?;
        *self.phase.lock().await = LifecyclePhase::Installed;
        Ok(())
    }

    /// Activate trigger: evict stale generations and take control.
    ///
    /// # Errors
    ///
    /// Returns `Error::Lifecycle` if no successful install preceded this
    /// activation.
    pub async fn on_activate(&self) -> Result<(), Error> {
        if *self.phase.lock().await == LifecyclePhase::Idle {
            return Err(Error::Lifecycle("activate before a successful install".into()));
        }
        self.lifecycle.activate().await?;
        *self.phase.lock().await = LifecyclePhase::Active;
        Ok(())
    }

    /// Fetch-intercept trigger: one request in, one response out.
    pub async fn on_fetch(&self, request: &RequestKey, accept: Option<&str>) -> Result<ServedResponse, Error> {
        let strategy = self.rules.select(request, accept);
        let navigation = routes::is_navigation(accept);
        tracing::debug!(request = %request, strategy = ?strategy, navigation, "dispatch");

        let ctx = ExecutorContext {
            store: self.store.as_ref(),
            fetcher: self.fetcher.as_ref(),
            cache_name: &self.cache_version,
            offline_fallback: &self.offline_fallback,
        };

        match strategy {
            Strategy::CacheFirst => strategies::cache_first::run(&ctx, request, accept, navigation).await,
            Strategy::NetworkFirst => strategies::network_first::run(&ctx, request, accept, navigation).await,
            Strategy::Bypass => strategies::bypass::run(&ctx, request, accept).await,
        }
    }
}
