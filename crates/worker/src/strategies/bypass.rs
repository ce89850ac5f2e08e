//! Bypass executor: forward to the network unconditionally.
//!
//! The response is neither inspected nor stored, and any network error
//! propagates to the caller unchanged.

use super::{ExecutorContext, ServedResponse};
use nimbus_core::{Error, RequestKey};

pub async fn run(
    ctx: &ExecutorContext<'_>,
    request: &RequestKey,
    accept: Option<&str>,
) -> Result<ServedResponse, Error> {
    let response = ctx.fetcher.fetch(request, accept).await?;
    Ok(ServedResponse::from_network(response))
}

#[cfg(test)]
mod tests {
    use super::super::ServedFrom;
    use super::*;
    use crate::testing::MockFetcher;
    use nimbus_core::{CacheStore, MemoryStore};

    fn fallback() -> RequestKey {
        RequestKey::get("https://example.com/offline.html").unwrap()
    }

    #[tokio::test]
    async fn test_forwards_without_storing() {
        let store = MemoryStore::new();
        let fetcher = MockFetcher::new();
        fetcher.respond("https://api.example.com/live", 200, b"live");
        let fb = fallback();
        let ctx = ExecutorContext { store: &store, fetcher: &fetcher, cache_name: "app-v1", offline_fallback: &fb };

        let request = RequestKey::new("POST", "https://api.example.com/live").unwrap();
        let response = run(&ctx, &request, None).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.served_from, ServedFrom::Network);
        assert!(!store.contains("app-v1", &request).await.unwrap());
    }

    #[tokio::test]
    async fn test_error_propagates_unchanged() {
        let store = MemoryStore::new();
        let fetcher = MockFetcher::new();
        fetcher.fail("https://api.example.com/live", "connection reset");
        let fb = fallback();
        let ctx = ExecutorContext { store: &store, fetcher: &fetcher, cache_name: "app-v1", offline_fallback: &fb };

        let request = RequestKey::get("https://api.example.com/live").unwrap();
        let err = run(&ctx, &request, None).await.unwrap_err();

        assert!(matches!(err, Error::NetworkFailure(_)));
    }
}
