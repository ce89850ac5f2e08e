//! Request identity: method plus canonicalized absolute URL.
//!
//! Every intercepted request is reduced to a [`RequestKey`] before it
//! touches the router, the store, or the network. Two requests with the
//! same key are the same cache entry.
//!
//! Canonicalization steps:
//! 1. Trim leading/trailing whitespace
//! 2. Default scheme to https:// for scheme-less input
//! 3. Remove fragment (#...)
//! 4. Keep query string intact (do not reorder)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::Error;

/// Identity of one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    /// Uppercased HTTP method.
    pub method: String,
    /// Canonicalized absolute URL.
    pub url: Url,
}

impl RequestKey {
    /// Build a key from a method and an absolute URL string.
    pub fn new(method: impl Into<String>, url: &str) -> Result<Self, Error> {
        let url = canonicalize(url)?;
        Ok(Self { method: method.into().to_ascii_uppercase(), url })
    }

    /// Shorthand for a GET key, the only method eligible for storage.
    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new("GET", url)
    }

    /// Build a GET key for a manifest identity, resolving relative paths
    /// (e.g. `/offline.html`) against the configured origin.
    pub fn resolve(origin: &Url, identity: &str) -> Result<Self, Error> {
        let trimmed = identity.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidUrl("empty identity".into()));
        }

        let mut url = match Url::parse(trimmed) {
            Ok(u) => u,
            Err(url::ParseError::RelativeUrlWithoutBase) => origin
                .join(trimmed)
                .map_err(|e| Error::InvalidUrl(e.to_string()))?,
            Err(e) => return Err(Error::InvalidUrl(e.to_string())),
        };
        url.set_fragment(None);

        Ok(Self { method: "GET".to_string(), url })
    }

    /// Whether this request uses the GET method.
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Whether the URL scheme is plain http(s). Anything else (`data:`,
    /// `blob:`, ...) never touches the store.
    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }

    /// Content-addressed store key for this identity.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.url.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Canonicalize a URL string for consistent cache identity.
///
/// The `url` crate already lowercases hosts and normalizes paths; this adds
/// trimming, a default https scheme, and fragment removal.
pub fn canonicalize(input: &str) -> Result<Url, Error> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("empty URL".into()));
    }

    let mut parsed = match Url::parse(trimmed) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}")).map_err(|e| Error::InvalidUrl(e.to_string()))?
        }
        Err(e) => return Err(Error::InvalidUrl(e.to_string())),
    };

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/Path");
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com/page#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/page");
    }

    #[test]
    fn test_canonicalize_preserve_query() {
        let url = canonicalize("https://example.com?a=1&b=2").unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  https://example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_canonicalize_data_uri_kept() {
        let url = canonicalize("data:text/plain,hello").unwrap();
        assert_eq!(url.scheme(), "data");
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize(""), Err(Error::InvalidUrl(_))));
        assert!(matches!(canonicalize("   "), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_key_method_uppercased() {
        let key = RequestKey::new("get", "https://example.com/a.css").unwrap();
        assert_eq!(key.method, "GET");
        assert!(key.is_get());
    }

    #[test]
    fn test_key_non_http_scheme() {
        let key = RequestKey::get("data:text/plain,hello").unwrap();
        assert!(!key.is_http());
    }

    #[test]
    fn test_cache_key_stability() {
        let a = RequestKey::get("https://example.com/style.css").unwrap();
        let b = RequestKey::get("https://example.com/style.css").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_varies_by_method() {
        let get = RequestKey::new("GET", "https://example.com/api").unwrap();
        let post = RequestKey::new("POST", "https://example.com/api").unwrap();
        assert_ne!(get.cache_key(), post.cache_key());
    }

    #[test]
    fn test_cache_key_format() {
        let key = RequestKey::get("https://example.com").unwrap().cache_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_resolve_relative_path() {
        let origin = Url::parse("https://app.example.com").unwrap();
        let key = RequestKey::resolve(&origin, "/offline.html").unwrap();
        assert_eq!(key.url.as_str(), "https://app.example.com/offline.html");
        assert!(key.is_get());
    }

    #[test]
    fn test_resolve_absolute_identity() {
        let origin = Url::parse("https://app.example.com").unwrap();
        let key = RequestKey::resolve(&origin, "https://cdn.example.com/icon.png").unwrap();
        assert_eq!(key.url.host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn test_resolve_empty_identity() {
        let origin = Url::parse("https://app.example.com").unwrap();
        assert!(RequestKey::resolve(&origin, "  ").is_err());
    }
}
