//! HTTP transport to the Typesense search API
//!
//! The transport is a trait seam so the client layer can be exercised
//! against a scripted mock in tests. The real implementation issues
//! `GET /collections/{collection}/documents/search` requests with the
//! read-only API key header.

use crate::error::SearchError;
use crate::query::SearchParams;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Header carrying the read-only search API key
const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// Status and raw body of one engine response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one search request against a named collection
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
        timeout: Duration,
    ) -> Result<TransportResponse, SearchError>;
}

/// Reqwest-backed transport bound to one host and API key
pub struct HttpTransport {
    client: Client,
    host: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SearchError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            host: host.into(),
            api_key: api_key.into(),
        })
    }

    fn search_url(&self, collection: &str) -> String {
        format!(
            "https://{}/collections/{}/documents/search",
            self.host, collection
        )
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
        timeout: Duration,
    ) -> Result<TransportResponse, SearchError> {
        let url = self.search_url(collection);
        debug!("Search request: {url} q={:?}", params.q);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&params.to_query_pairs())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(e.to_string())
                } else if e.is_connect() {
                    SearchError::Transport(format!("connection failed: {e}"))
                } else if e.is_request() {
                    SearchError::Other(format!("request build failed: {e}"))
                } else {
                    SearchError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(format!("failed to read body: {e}")))?;

        Ok(TransportResponse { status, body })
    }
}
