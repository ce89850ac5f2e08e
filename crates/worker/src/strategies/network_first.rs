//! Network-first executor.
//!
//! Always fetch first; every success refreshes the store, so the entry for
//! an identity always reflects the latest successful fetch. On network
//! failure the stored entry is served instead; with neither, navigations
//! get the offline page and anything else propagates the failure.

use super::{ExecutorContext, ServedFrom, ServedResponse, offline_fallback, store_copy};
use nimbus_core::{Error, RequestKey};

pub async fn run(
    ctx: &ExecutorContext<'_>,
    request: &RequestKey,
    accept: Option<&str>,
    navigation: bool,
) -> Result<ServedResponse, Error> {
    match ctx.fetcher.fetch(request, accept).await {
        Ok(response) => {
            if request.is_get() && response.is_success() {
                store_copy(ctx, request, &response).await;
            }
            Ok(ServedResponse::from_network(response))
        }
        Err(err) => {
            if let Some(entry) = ctx.store.match_entry(ctx.cache_name, request).await? {
                tracing::debug!(request = %request, "network-first: network down, serving cached entry");
                return Ok(ServedResponse::from_stored(entry, ServedFrom::Cache));
            }
            if navigation && let Some(page) = offline_fallback(ctx).await? {
                return Ok(page);
            }
            Err(err)
        }
    }
}
