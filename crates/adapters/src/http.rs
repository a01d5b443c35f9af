//! reqwest-backed implementation of the HTTP port

use async_trait::async_trait;
use postfeed_domain::{HttpClient, HttpError, HttpResponse};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

const USER_AGENT: &str = concat!("postfeed/", env!("CARGO_PKG_VERSION"));

/// HTTP client for every outbound platform request
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::Body(e.to_string()))?;

        Ok(HttpResponse::new(status, body))
    }
}

/// Canned HTTP client for offline runs and tests
pub struct StubHttpClient {
    responses: HashMap<String, HttpResponse>,
    requested: Mutex<Vec<String>>,
}

impl StubHttpClient {
    /// Every request fails with a network error
    pub fn offline() -> Self {
        Self::with_responses(vec![])
    }

    pub fn with_responses(responses: Vec<(String, HttpResponse)>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            requested: Mutex::new(vec![]),
        }
    }

    /// URLs requested so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| HttpError::Network(format!("No stub response for {}", url)))
    }
}
