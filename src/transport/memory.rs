use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory resource map with per-path fetch counters.
///
/// Every fetch yields to the scheduler once before answering, so concurrent
/// callers interleave the way they would against a real network.
#[derive(Default)]
pub struct MemoryTransport {
    resources: RwLock<HashMap<String, Result<Vec<u8>, TransportError>>>,
    fetches: RwLock<HashMap<String, usize>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.resources.write().insert(path.into(), Ok(body.into()));
    }

    pub fn insert_json<T: serde::Serialize>(&self, path: impl Into<String>, value: &T) {
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.insert(path, body);
    }

    /// Make `path` answer with the given status code.
    pub fn fail(&self, path: impl Into<String>, status: u16) {
        let path = path.into();
        self.resources.write().insert(
            path.clone(),
            Err(TransportError::Status { path, status }),
        );
    }

    /// Number of fetches issued for `path` so far.
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.read().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.read().values().sum()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        *self.fetches.write().entry(path.to_string()).or_insert(0) += 1;
        tokio::task::yield_now().await;
        self.resources
            .read()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::NotFound(path.to_string())))
    }
}
