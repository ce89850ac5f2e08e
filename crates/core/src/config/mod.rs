//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NIMBUS_*)
//! 2. TOML config file (if NIMBUS_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! All routing behavior (excluded domains, API prefixes, navigation
//! strategy, offline fallback) lives here: the engine hard-codes no route.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Which strategy handles HTML navigation requests.
///
/// The two deployed service-worker variants differ here, so it is a
/// configuration point rather than a hard-coded rule. Both variants fall
/// back to the offline page when everything else fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationStrategy {
    /// Try the network, fall back to cache, then the offline page.
    NetworkFirst,
    /// Serve from cache, refresh from network on miss.
    CacheFirst,
}

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NIMBUS_*)
/// 2. TOML config file (if NIMBUS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the current cache generation, e.g. `nimbus-v1.1.0`.
    ///
    /// Exactly one generation is current at any time; activation deletes
    /// every store with a different name.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Origin that relative manifest paths and the offline fallback
    /// resolve against.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// App-shell resources that must all be cached before an install
    /// counts as successful.
    #[serde(default = "default_precache_manifest")]
    pub precache_manifest: Vec<String>,

    /// Domains that must always be fetched live (third-party APIs,
    /// storage backends). Matching requests bypass the store entirely.
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,

    /// Path prefixes treated as API-like and served network-first.
    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,

    /// Strategy for HTML navigation requests.
    #[serde(default = "default_navigation_strategy")]
    pub navigation_strategy: NavigationStrategy,

    /// Identity served when both store and network fail for a navigation.
    #[serde(default = "default_offline_fallback")]
    pub offline_fallback: String,

    /// User-Agent string for outgoing fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_cache_version() -> String {
    "nimbus-v1.0.0".into()
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./nimbus-cache.sqlite")
}

fn default_precache_manifest() -> Vec<String> {
    vec![
        "/".into(),
        "/manifest.json".into(),
        "/icons/icon-192x192.png".into(),
        "/icons/icon-512x512.png".into(),
        "/offline.html".into(),
    ]
}

fn default_excluded_domains() -> Vec<String> {
    vec![
        "firestore.googleapis.com".into(),
        "firebasestorage.googleapis.com".into(),
        "googleapis.com".into(),
        "railway.app".into(),
    ]
}

fn default_api_prefixes() -> Vec<String> {
    vec!["/api/".into(), "/firestore/".into()]
}

fn default_navigation_strategy() -> NavigationStrategy {
    NavigationStrategy::NetworkFirst
}

fn default_offline_fallback() -> String {
    "/offline.html".into()
}

fn default_user_agent() -> String {
    "nimbus-sw/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_version: default_cache_version(),
            origin: default_origin(),
            db_path: default_db_path(),
            precache_manifest: default_precache_manifest(),
            excluded_domains: default_excluded_domains(),
            api_prefixes: default_api_prefixes(),
            navigation_strategy: default_navigation_strategy(),
            offline_fallback: default_offline_fallback(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl WorkerConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The configured origin as a parsed URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not a valid
    /// http(s) URL. `load()` has already checked this, so callers going
    /// through `load()` can rely on it parsing.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin).map_err(|e| ConfigError::Invalid {
            field: "origin".into(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: format!("unsupported scheme: {scheme}"),
            }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NIMBUS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NIMBUS_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
