//! Network client for nimbus.
//!
//! This crate provides the network fetcher contract used by the strategy
//! executors and its reqwest-backed implementation.

pub mod fetch;

pub use fetch::{FetchConfig, FetchedResponse, HttpFetcher, NetworkFetcher};
