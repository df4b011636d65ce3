//! Test support: a scriptable transport and store helpers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;
use waycache_client::{Bytes, HeaderMap, NetResponse, StatusCode, Transport, TransportError};
use waycache_core::{CacheStore, GenerationCache, StoredResponse};

/// Transport stand-in with canned responses, an offline toggle, and a call
/// log. URLs with no canned response fail as transport errors.
pub(crate) struct StubTransport {
    responses: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self { responses: Mutex::new(HashMap::new()), offline: AtomicBool::new(false), calls: Mutex::new(Vec::new()) }
    }

    pub fn respond(&self, url: &str, status: u16, body: &[u8]) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.to_vec()));
    }

    pub fn forget(&self, url: &str) {
        self.responses.lock().unwrap().remove(url);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn fetch(&self, url: &Url) -> Result<NetResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Network("connection refused".into()));
        }

        let responses = self.responses.lock().unwrap();
        match responses.get(url.as_str()) {
            Some((status, body)) => Ok(NetResponse {
                url: url.clone(),
                status: StatusCode::from_u16(*status).unwrap(),
                headers: HeaderMap::new(),
                body: Bytes::from(body.clone()),
            }),
            None => Err(TransportError::Network(format!("no stub for {url}"))),
        }
    }
}

/// In-memory store with one opened generation.
pub(crate) async fn memory_generation(name: &str) -> (CacheStore, GenerationCache) {
    let store = CacheStore::open_in_memory().await.unwrap();
    let cache = store.open_generation(name).await.unwrap();
    (store, cache)
}

/// Poll until a background cache write lands.
pub(crate) async fn wait_for_entry(cache: &GenerationCache, key: &str) -> StoredResponse {
    for _ in 0..100 {
        if let Some(entry) = cache.lookup(key).await.unwrap() {
            return entry;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("cache entry for {key} never appeared");
}
