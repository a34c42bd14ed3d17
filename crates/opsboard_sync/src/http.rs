//! HTTP-backed fetcher.
//!
//! The actual HTTP client is abstracted via a trait to allow different
//! implementations (reqwest, test doubles) to supply the transport. Payloads
//! travel as JSON; the domain selects the endpoint and the expected shape.

use crate::error::{SyncError, SyncResult};
use crate::fetch::Fetcher;
use async_trait::async_trait;
use opsboard_domain::{Domain, DomainPayload};

/// Response from an HTTP client: status code plus raw body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual transport. The error string
/// covers transport-level failures only (DNS, connect, reset); status-based
/// failures are classified by the fetcher.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues a GET request and returns the status and body.
    async fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// A fetcher that retrieves domain payloads over HTTP as JSON.
pub struct HttpFetcher<C: HttpClient> {
    /// Base URL of the backend (e.g. `https://ops.example.com`).
    base_url: String,
    /// HTTP client implementation.
    client: C,
}

impl<C: HttpClient> HttpFetcher<C> {
    /// Creates a new HTTP fetcher.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a domain's endpoint.
    pub fn url_for(&self, domain: Domain) -> String {
        format!("{}{}", self.base_url, domain.endpoint())
    }
}

#[async_trait]
impl<C: HttpClient> Fetcher for HttpFetcher<C> {
    async fn fetch(&self, domain: Domain) -> SyncResult<DomainPayload> {
        let url = self.url_for(domain);
        let response = self.client.get(&url).await.map_err(SyncError::Network)?;

        if !(200..300).contains(&response.status) {
            return Err(SyncError::Server {
                status: response.status,
            });
        }

        DomainPayload::decode(domain, &response.body)
            .map_err(|e| SyncError::Parse(e.to_string()))
    }
}
