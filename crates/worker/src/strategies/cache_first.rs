//! Cache-first executor.
//!
//! Store hit -> return the stored entry, never touching the network.
//! Miss -> fetch; a 200 is copied into the store and the original
//! returned; anything else is returned without storing. Total network
//! failure answers with the offline page for navigations, otherwise a
//! synthetic 408, so the caller always receives a response object.

use super::{ExecutorContext, ServedFrom, ServedResponse, offline_fallback, store_copy};
use nimbus_core::{Error, RequestKey};

pub async fn run(
    ctx: &ExecutorContext<'_>,
    request: &RequestKey,
    accept: Option<&str>,
    navigation: bool,
) -> Result<ServedResponse, Error> {
    if let Some(entry) = ctx.store.match_entry(ctx.cache_name, request).await? {
        tracing::debug!(request = %request, "cache-first: hit");
        return Ok(ServedResponse::from_stored(entry, ServedFrom::Cache));
    }

    match ctx.fetcher.fetch(request, accept).await {
        Ok(response) => {
            if request.is_get() && response.status == 200 {
                store_copy(ctx, request, &response).await;
            }
            Ok(ServedResponse::from_network(response))
        }
        Err(err) => {
            tracing::debug!(request = %request, error = %err, "cache-first: fetch failed, serving fallback");
            if navigation && let Some(page) = offline_fallback(ctx).await? {
                return Ok(page);
            }
            Ok(ServedResponse::network_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;
    use nimbus_core::{CacheStore, MemoryStore, StoredResponse};

    const CACHE: &str = "app-v1";

    struct Harness {
        store: MemoryStore,
        fetcher: MockFetcher,
        fallback: RequestKey,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                fetcher: MockFetcher::new(),
                fallback: RequestKey::get("https://example.com/offline.html").unwrap(),
            }
        }

        fn ctx(&self) -> ExecutorContext<'_> {
            ExecutorContext {
                store: &self.store,
                fetcher: &self.fetcher,
                cache_name: CACHE,
                offline_fallback: &self.fallback,
            }
        }
    }

    #[tokio::test]
    async fn test_hit_never_touches_network() {
        let h = Harness::new();
        let request = RequestKey::get("https://example.com/style.css").unwrap();
        h.store
            .put(CACHE, &request, StoredResponse::new(200, b"cached css".to_vec()))
            .await
            .unwrap();

        let response = run(&h.ctx(), &request, None, false).await.unwrap();

        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(response.body.as_ref(), b"cached css");
        assert_eq!(h.fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let h = Harness::new();
        h.fetcher.respond("https://example.com/style.css", 200, b"fresh css");
        let request = RequestKey::get("https://example.com/style.css").unwrap();

        let response = run(&h.ctx(), &request, None, false).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.served_from, ServedFrom::Network);
        assert_eq!(response.body.as_ref(), b"fresh css");

        let stored = h.store.match_entry(CACHE, &request).await.unwrap().unwrap();
        assert_eq!(stored.body, b"fresh css".to_vec());

        // second identical request is served from the store
        let second = run(&h.ctx(), &request, None, false).await.unwrap();
        assert_eq!(second.served_from, ServedFrom::Cache);
        assert_eq!(h.fetcher.fetch_count("https://example.com/style.css"), 1);
    }

    #[tokio::test]
    async fn test_idempotent_responses() {
        let h = Harness::new();
        h.fetcher.respond("https://example.com/app.js", 200, b"let x = 1;");
        let request = RequestKey::get("https://example.com/app.js").unwrap();

        let first = run(&h.ctx(), &request, None, false).await.unwrap();
        let second = run(&h.ctx(), &request, None, false).await.unwrap();

        assert_eq!(first.body, second.body);
        assert_eq!(first.status, second.status);
    }

    #[tokio::test]
    async fn test_non_200_returned_but_not_stored() {
        let h = Harness::new();
        h.fetcher.respond("https://example.com/missing.png", 404, b"not found");
        let request = RequestKey::get("https://example.com/missing.png").unwrap();

        let response = run(&h.ctx(), &request, None, false).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!h.store.contains(CACHE, &request).await.unwrap());
    }

    #[tokio::test]
    async fn test_network_failure_returns_synthetic_408() {
        let h = Harness::new();
        h.fetcher.set_offline(true);
        let request = RequestKey::get("https://example.com/font.woff2").unwrap();

        let response = run(&h.ctx(), &request, None, false).await.unwrap();

        assert_eq!(response.status, 408);
        assert_eq!(response.served_from, ServedFrom::Synthetic);
    }

    #[tokio::test]
    async fn test_navigation_failure_serves_offline_page() {
        let h = Harness::new();
        h.store
            .put(
                CACHE,
                &h.fallback,
                StoredResponse::new(200, b"<h1>offline</h1>".to_vec()).with_content_type("text/html"),
            )
            .await
            .unwrap();
        h.fetcher.set_offline(true);

        let request = RequestKey::get("https://example.com/dashboard").unwrap();
        let response = run(&h.ctx(), &request, Some("text/html"), true).await.unwrap();

        assert_eq!(response.served_from, ServedFrom::OfflineFallback);
        assert_eq!(response.status, 200);
        assert_ne!(response.status, 408);
        assert_eq!(response.body.as_ref(), b"<h1>offline</h1>");
    }

    #[tokio::test]
    async fn test_navigation_failure_without_offline_page_degrades_to_408() {
        let h = Harness::new();
        h.fetcher.set_offline(true);

        let request = RequestKey::get("https://example.com/dashboard").unwrap();
        let response = run(&h.ctx(), &request, Some("text/html"), true).await.unwrap();

        assert_eq!(response.status, 408);
        assert_eq!(response.served_from, ServedFrom::Synthetic);
    }
}
