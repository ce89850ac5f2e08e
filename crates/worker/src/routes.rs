//! Route rules and strategy selection.
//!
//! Selection is a pure function over the request identity and the caller's
//! Accept header, evaluated against immutable rules in fixed priority
//! order; the first matching rule wins:
//!
//! 1. non-GET method or non-http(s) scheme -> bypass
//! 2. excluded domain -> bypass
//! 3. API-like path -> network-first
//! 4. HTML navigation -> configured navigation strategy
//! 5. everything else -> cache-first

use nimbus_core::{NavigationStrategy, RequestKey, WorkerConfig};

/// Caching strategy chosen for one request.
///
/// Navigation-ness is not a variant of its own: it only changes the
/// failure path inside an executor, so it travels as a separate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Forward to the network; never touch the store.
    Bypass,
    /// Serve from the store, refresh from network on miss.
    CacheFirst,
    /// Fetch fresh, fall back to the store.
    NetworkFirst,
}

/// Immutable routing configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct RouteRules {
    excluded_domains: Vec<String>,
    api_prefixes: Vec<String>,
    navigation_strategy: NavigationStrategy,
}

impl RouteRules {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            excluded_domains: config.excluded_domains.clone(),
            api_prefixes: config.api_prefixes.clone(),
            navigation_strategy: config.navigation_strategy,
        }
    }

    /// Choose the strategy for a request. First match wins.
    pub fn select(&self, request: &RequestKey, accept: Option<&str>) -> Strategy {
        if !request.is_get() || !request.is_http() {
            return Strategy::Bypass;
        }

        if let Some(host) = request.url.host_str()
            && self
                .excluded_domains
                .iter()
                .any(|domain| host == domain || host.ends_with(&format!(".{domain}")))
        {
            return Strategy::Bypass;
        }

        let path = request.url.path();
        if self.api_prefixes.iter().any(|prefix| path.contains(prefix.as_str())) {
            return Strategy::NetworkFirst;
        }

        if is_navigation(accept) {
            return match self.navigation_strategy {
                NavigationStrategy::NetworkFirst => Strategy::NetworkFirst,
                NavigationStrategy::CacheFirst => Strategy::CacheFirst,
            };
        }

        Strategy::CacheFirst
    }
}

/// Whether the Accept header indicates an HTML navigation request.
pub fn is_navigation(accept: Option<&str>) -> bool {
    accept.is_some_and(|a| a.contains("text/html"))
}
