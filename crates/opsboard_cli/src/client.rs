//! reqwest-backed HTTP client for the sync core.

use async_trait::async_trait;
use opsboard_sync::{HttpClient, HttpResponse};

/// HTTP client implementation backed by `reqwest`.
///
/// Transport failures (DNS, connect, reset) surface as the error string; the
/// fetcher classifies everything else from the status code.
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with default settings.
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let response = self.inner.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| e.to_string())?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
