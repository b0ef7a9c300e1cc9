use super::{join_path, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use tracing::debug;

/// Fetches resources relative to an HTTP(S) base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        join_path(&self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let url = self.url_for(path);
        debug!(url = %url, "HTTP fetch");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| TransportError::Request {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(body.to_vec())
    }
}
