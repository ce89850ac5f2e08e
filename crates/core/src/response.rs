//! Stored response payloads.
//!
//! A [`StoredResponse`] is the value half of a cache entry: status,
//! headers, body bytes and the storage timestamp. Entries are replaced
//! wholesale on refresh, never mutated in place.

use serde::{Deserialize, Serialize};

/// A response payload as persisted in a cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header value, if any.
    pub content_type: Option<String>,
    /// Response headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
    /// RFC3339 timestamp of when the entry was stored.
    pub stored_at: String,
}

impl StoredResponse {
    /// Create a new response payload stamped with the current time.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: None,
            headers: Vec::new(),
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the content type as an Option.
    pub fn with_content_type_option(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Set the response headers.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Whether the status is a 2xx success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
