//! The nimbus strategy engine.
//!
//! This crate implements the request interception and caching-strategy
//! engine of a progressive web app's offline worker:
//!
//! - [`routes`]: pure strategy selection over immutable route rules
//! - [`strategies`]: one executor per strategy (bypass, cache-first,
//!   network-first) with defined fallback order
//! - [`lifecycle`]: versioned cache install/activate with atomic precache
//!   and stale-generation eviction
//! - [`worker`]: the interception gateway, one method per host lifecycle
//!   trigger, exactly one response per request

pub mod lifecycle;
pub mod routes;
pub mod strategies;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use lifecycle::LifecycleManager;
pub use routes::{RouteRules, Strategy};
pub use strategies::{ServedFrom, ServedResponse};
pub use worker::ServiceWorker;
