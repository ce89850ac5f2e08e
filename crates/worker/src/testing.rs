//! Test doubles shared by the engine tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use nimbus_client::{FetchedResponse, NetworkFetcher};
use nimbus_core::{Error, RequestKey};

enum MockOutcome {
    Respond { status: u16, content_type: Option<String>, body: Bytes },
    Fail(String),
}

/// Scripted network fetcher that counts calls per URL.
#[derive(Default)]
pub(crate) struct MockFetcher {
    routes: Mutex<HashMap<String, MockOutcome>>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn canonical(url: &str) -> String {
        RequestKey::get(url).expect("valid mock URL").url.to_string()
    }

    pub fn respond(&self, url: &str, status: u16, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            Self::canonical(url),
            MockOutcome::Respond { status, content_type: None, body: Bytes::copy_from_slice(body) },
        );
    }

    pub fn respond_html(&self, url: &str, status: u16, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            Self::canonical(url),
            MockOutcome::Respond {
                status,
                content_type: Some("text/html".to_string()),
                body: Bytes::copy_from_slice(body),
            },
        );
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(Self::canonical(url), MockOutcome::Fail(reason.to_string()));
    }

    /// Simulate total network loss: every fetch fails regardless of script.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&Self::canonical(url))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl NetworkFetcher for MockFetcher {
    async fn fetch(&self, request: &RequestKey, _accept: Option<&str>) -> Result<FetchedResponse, Error> {
        let url = request.url.to_string();
        *self.calls.lock().unwrap().entry(url.clone()).or_insert(0) += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkFailure("offline".to_string()));
        }

        match self.routes.lock().unwrap().get(&url) {
            Some(MockOutcome::Respond { status, content_type, body }) => Ok(FetchedResponse {
                url: request.url.clone(),
                final_url: request.url.clone(),
                status: *status,
                content_type: content_type.clone(),
                headers: Vec::new(),
                bytes: body.clone(),
                fetch_ms: 0,
            }),
            Some(MockOutcome::Fail(reason)) => Err(Error::NetworkFailure(reason.clone())),
            None => Err(Error::NetworkFailure(format!("no scripted response for {url}"))),
        }
    }
}
