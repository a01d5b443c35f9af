//! Proxy resolution - direct fetch with an ordered CORS-proxy fallback chain

use std::sync::Arc;

use crate::ports::{HttpClient, HttpResponse};

/// Placeholder substituted with the percent-encoded target URL
pub const URL_PLACEHOLDER: &str = "{url}";

/// Every attempt (direct and proxied) failed
#[derive(Debug, Clone, thiserror::Error)]
#[error("All {} fetch attempts failed for {url}", .attempts.len())]
pub struct ProxyExhaustedError {
    /// Target URL
    pub url: String,
    /// One entry per attempt, in order: "<requested url>: <reason>"
    pub attempts: Vec<String>,
}

/// HTTP fetcher that falls back to relay services when a direct GET fails
pub struct ProxyFetcher {
    client: Arc<dyn HttpClient>,
    proxies: Vec<String>,
}

impl ProxyFetcher {
    pub fn new(client: Arc<dyn HttpClient>, proxies: Vec<String>) -> Self {
        Self { client, proxies }
    }

    /// Fetcher without any proxy (direct attempt only)
    pub fn direct(client: Arc<dyn HttpClient>) -> Self {
        Self::new(client, vec![])
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }

    /// Fetch `url` directly, then through each proxy once, in order.
    /// Returns the first 2xx response.
    pub async fn fetch_with_proxy(&self, url: &str) -> Result<HttpResponse, ProxyExhaustedError> {
        let mut attempts = Vec::with_capacity(self.proxies.len() + 1);

        match self.attempt(url).await {
            Ok(response) => return Ok(response),
            Err(reason) => {
                tracing::debug!(url = %url, reason = %reason, "Direct fetch failed");
                attempts.push(format!("{}: {}", url, reason));
            }
        }

        for pattern in &self.proxies {
            let proxied = proxied_url(pattern, url);
            match self.attempt(&proxied).await {
                Ok(response) => {
                    tracing::debug!(url = %url, proxy = %pattern, "Fetched through proxy");
                    return Ok(response);
                }
                Err(reason) => {
                    tracing::debug!(url = %url, proxy = %pattern, reason = %reason, "Proxy fetch failed");
                    attempts.push(format!("{}: {}", proxied, reason));
                }
            }
        }

        tracing::warn!(url = %url, attempts = attempts.len(), "Proxy chain exhausted");

        Err(ProxyExhaustedError {
            url: url.to_string(),
            attempts,
        })
    }

    async fn attempt(&self, url: &str) -> Result<HttpResponse, String> {
        match self.client.get(url).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(format!("status {}", response.status)),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Build the relay URL for `target` from a proxy pattern
pub fn proxied_url(pattern: &str, target: &str) -> String {
    let encoded = urlencoding::encode(target);
    if pattern.contains(URL_PLACEHOLDER) {
        pattern.replace(URL_PLACEHOLDER, &encoded)
    } else {
        format!("{}{}", pattern, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::HttpError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted client: unknown URLs fail with a network error
    struct ScriptedClient {
        responses: HashMap<String, HttpResponse>,
        requested: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<(String, HttpResponse)>) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                requested: Mutex::new(vec![]),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| HttpError::Network("connection refused".to_string()))
        }
    }

    const TARGET: &str = "https://dev.to/api/articles?per_page=5";

    fn proxies() -> Vec<String> {
        vec![
            "https://proxy-one.example/raw?url={url}".to_string(),
            "https://proxy-two.example/?{url}".to_string(),
            "https://proxy-three.example/get?q=".to_string(),
        ]
    }

    #[test]
    fn test_proxied_url_encodes_target() {
        assert_eq!(
            proxied_url("https://p.example/raw?url={url}", "https://a.b/c?d=1&e=2"),
            "https://p.example/raw?url=https%3A%2F%2Fa.b%2Fc%3Fd%3D1%26e%3D2"
        );
        assert_eq!(
            proxied_url("https://p.example/?q=", "https://a.b/"),
            "https://p.example/?q=https%3A%2F%2Fa.b%2F"
        );
    }

    #[tokio::test]
    async fn test_direct_success_skips_proxies() {
        let client = Arc::new(ScriptedClient::new(vec![(
            TARGET.to_string(),
            HttpResponse::new(200, "direct"),
        )]));
        let fetcher = ProxyFetcher::new(client.clone(), proxies());

        let response = fetcher.fetch_with_proxy(TARGET).await.unwrap();

        assert_eq!(response.body, "direct");
        assert_eq!(client.requested(), vec![TARGET.to_string()]);
    }

    #[tokio::test]
    async fn test_second_proxy_success_stops_chain() {
        let second = proxied_url(&proxies()[1], TARGET);
        let client = Arc::new(ScriptedClient::new(vec![
            (TARGET.to_string(), HttpResponse::new(403, "cors")),
            (second.clone(), HttpResponse::new(200, "via proxy two")),
        ]));
        let fetcher = ProxyFetcher::new(client.clone(), proxies());

        let response = fetcher.fetch_with_proxy(TARGET).await.unwrap();

        assert_eq!(response.body, "via proxy two");
        let requested = client.requested();
        assert_eq!(requested.len(), 3);
        assert_eq!(requested[0], TARGET);
        assert_eq!(requested[1], proxied_url(&proxies()[0], TARGET));
        assert_eq!(requested[2], second);
    }

    #[tokio::test]
    async fn test_all_attempts_failing_is_an_error() {
        let client = Arc::new(ScriptedClient::new(vec![(
            TARGET.to_string(),
            HttpResponse::new(500, "boom"),
        )]));
        let fetcher = ProxyFetcher::new(client.clone(), proxies());

        let err = fetcher.fetch_with_proxy(TARGET).await.unwrap_err();

        assert_eq!(err.url, TARGET);
        assert_eq!(err.attempts.len(), 4);
        assert!(err.attempts[0].ends_with("status 500"));
        assert!(err.to_string().contains("All 4 fetch attempts failed"));
    }

    #[tokio::test]
    async fn test_direct_fetcher_has_single_attempt() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let fetcher = ProxyFetcher::direct(client.clone());

        let err = fetcher.fetch_with_proxy(TARGET).await.unwrap_err();

        assert_eq!(err.attempts.len(), 1);
        assert_eq!(client.requested().len(), 1);
    }
}
