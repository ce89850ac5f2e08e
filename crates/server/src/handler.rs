//! Line protocol for the stdio transport.
//!
//! Each line on stdin is one intercepted request; each line on stdout is
//! exactly one reply. Replies are tagged with `kind` so the host can tell
//! a served response from a protocol or network error without inspecting
//! status codes.

use serde::{Deserialize, Serialize};

use nimbus_core::RequestKey;
use nimbus_worker::ServiceWorker;

#[derive(Debug, Deserialize)]
pub struct InterceptRequest {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub accept: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Reply {
    Response {
        url: String,
        status: u16,
        source: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
        body: String,
        body_len: usize,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        error: String,
    },
}

/// Handle one stdin line and produce the reply line.
///
/// Malformed JSON and request failures both become `Reply::Error`; this
/// function never fails, so the one-reply-per-line contract holds.
pub async fn handle_line(worker: &ServiceWorker, line: &str) -> Reply {
    let request: InterceptRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "malformed request line");
            return Reply::Error { url: None, error: format!("malformed request: {e}") };
        }
    };

    let key = match RequestKey::new(&request.method, &request.url) {
        Ok(key) => key,
        Err(e) => return Reply::Error { url: Some(request.url), error: e.to_string() },
    };

    match worker.on_fetch(&key, request.accept.as_deref()).await {
        Ok(response) => Reply::Response {
            url: key.url.to_string(),
            status: response.status,
            source: response.served_from.as_str(),
            content_type: response.content_type.clone(),
            body_len: response.body.len(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
        },
        Err(e) => {
            tracing::warn!(url = %key, error = %e, "fetch failed");
            Reply::Error { url: Some(key.url.to_string()), error: e.to_string() }
        }
    }
}
