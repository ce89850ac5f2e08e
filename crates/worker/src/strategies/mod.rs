//! Strategy executors.
//!
//! One executor per strategy, each a fetch/cache choreography with a
//! defined fallback order. Shared rule: a response that is both returned
//! to the caller and written to the store is duplicated first via
//! [`FetchedResponse::to_stored`], so the store write and the caller
//! delivery consume independent copies of the body. A failed store write
//! is logged and never fails the response.

pub mod bypass;
pub mod cache_first;
pub mod network_first;

use bytes::Bytes;

use nimbus_client::{FetchedResponse, NetworkFetcher};
use nimbus_core::{CacheStore, Error, RequestKey, StoredResponse};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Fresh from the network.
    Network,
    /// From the current cache generation.
    Cache,
    /// The reserved offline page.
    OfflineFallback,
    /// Synthesized locally (nothing else to serve).
    Synthetic,
}

impl ServedFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedFrom::Network => "network",
            ServedFrom::Cache => "cache",
            ServedFrom::OfflineFallback => "offline-fallback",
            ServedFrom::Synthetic => "synthetic",
        }
    }
}

/// The one response every intercepted request gets back.
#[derive(Debug, Clone)]
pub struct ServedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub served_from: ServedFrom,
}

impl ServedResponse {
    pub fn from_network(response: FetchedResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            headers: response.headers,
            body: response.bytes,
            served_from: ServedFrom::Network,
        }
    }

    pub fn from_stored(entry: StoredResponse, served_from: ServedFrom) -> Self {
        Self {
            status: entry.status,
            content_type: entry.content_type,
            headers: entry.headers,
            body: Bytes::from(entry.body),
            served_from,
        }
    }

    /// Synthetic response for "network unavailable, nothing cached".
    pub fn network_error() -> Self {
        Self {
            status: 408,
            content_type: Some("text/plain".to_string()),
            headers: Vec::new(),
            body: Bytes::from_static(b"Network error"),
            served_from: ServedFrom::Synthetic,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Collaborators one executor run needs.
pub struct ExecutorContext<'a> {
    pub store: &'a dyn CacheStore,
    pub fetcher: &'a dyn NetworkFetcher,
    /// Name of the current cache generation.
    pub cache_name: &'a str,
    /// Identity of the reserved offline page.
    pub offline_fallback: &'a RequestKey,
}

/// Look up the offline page in the current generation.
pub(crate) async fn offline_fallback(ctx: &ExecutorContext<'_>) -> Result<Option<ServedResponse>, Error> {
    Ok(ctx
        .store
        .match_entry(ctx.cache_name, ctx.offline_fallback)
        .await?
        .map(|entry| ServedResponse::from_stored(entry, ServedFrom::OfflineFallback)))
}

/// Write a duplicate of the response into the current generation.
pub(crate) async fn store_copy(ctx: &ExecutorContext<'_>, request: &RequestKey, response: &FetchedResponse) {
    let copy = response.to_stored();
    if let Err(err) = ctx.store.put(ctx.cache_name, request, copy).await {
        tracing::warn!(request = %request, error = %err, "failed to store response copy");
    }
}
