//! Client for the rss2json feed conversion service
//!
//! Hashnode and Medium publish RSS only; the converter hands back JSON items
//! that both adapters map into posts.

use postfeed_domain::AdapterError;
use postfeed_domain::usecases::ProxyFetcher;
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_ENDPOINT: &str = "https://api.rss2json.com/v1/api.json";

/// Converter response envelope
#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<FeedItem>,
}

/// One converted RSS item; every field is optional in practice
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedItem {
    pub title: Option<String>,
    pub pub_date: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub author: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub enclosure: Option<Enclosure>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Enclosure {
    pub link: Option<String>,
}

impl FeedItem {
    /// Article link, falling back to a URL-shaped guid
    pub fn url(&self) -> Option<&str> {
        self.link
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .or_else(|| self.guid.as_deref().filter(|g| g.starts_with("http")))
    }

    /// Thumbnail, or the enclosure when it carries the image
    pub fn image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                self.enclosure
                    .as_ref()
                    .and_then(|e| e.link.as_deref())
                    .filter(|l| !l.trim().is_empty())
            })
    }

    /// Full body when present, else the description
    pub fn body(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.description.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

/// RSS-to-JSON conversion through the shared proxy chain
pub struct Rss2JsonClient {
    fetcher: Arc<ProxyFetcher>,
    endpoint: String,
}

impl Rss2JsonClient {
    pub fn new(fetcher: Arc<ProxyFetcher>, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Convert `feed_url` and return its items
    pub async fn fetch_items(&self, feed_url: &str) -> Result<Vec<FeedItem>, AdapterError> {
        let url = format!(
            "{}?rss_url={}",
            self.endpoint,
            urlencoding::encode(feed_url)
        );

        tracing::debug!(feed = %feed_url, "Converting feed");

        let response = self
            .fetcher
            .fetch_with_proxy(&url)
            .await
            .map_err(|e| AdapterError::Request(e.to_string()))?;

        let feed: FeedResponse = serde_json::from_str(&response.body)
            .map_err(|e| AdapterError::InvalidFormat(e.to_string()))?;

        if feed.status != "ok" {
            return Err(AdapterError::Converter(
                feed.message
                    .unwrap_or_else(|| format!("status {}", feed.status)),
            ));
        }

        Ok(feed.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ReqwestHttpClient;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Rss2JsonClient {
        let http = ReqwestHttpClient::new(Duration::from_secs(5)).unwrap();
        Rss2JsonClient::new(
            Arc::new(ProxyFetcher::direct(Arc::new(http))),
            format!("{}/v1/api.json", server.uri()),
        )
    }

    #[tokio::test]
    async fn test_fetch_items() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .and(query_param("rss_url", "https://hashnode.com/n/rust/rss"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "feed": { "title": "Rust" },
                "items": [{
                    "title": "Ownership",
                    "pubDate": "2024-03-01 08:30:00",
                    "link": "https://blog.example/ownership",
                    "guid": "abc",
                    "author": "Ferris",
                    "thumbnail": "",
                    "description": "<p>Intro</p>",
                    "content": "<p>Full</p>",
                    "enclosure": { "link": "https://cdn.example/cover.png" },
                    "categories": ["rust"]
                }]
            })))
            .mount(&mock_server)
            .await;

        let items = client(&mock_server)
            .fetch_items("https://hashnode.com/n/rust/rss")
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.url(), Some("https://blog.example/ownership"));
        assert_eq!(item.image(), Some("https://cdn.example/cover.png"));
        assert_eq!(item.body(), Some("<p>Full</p>"));
        assert_eq!(item.categories, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_converter_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "rss_url parameter is required."
            })))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server).fetch_items("").await;

        match result {
            Err(AdapterError::Converter(message)) => assert!(message.contains("rss_url")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_item_fallbacks() {
        let item = FeedItem {
            guid: Some("https://blog.example/by-guid".to_string()),
            description: Some("<p>Only description</p>".to_string()),
            ..FeedItem::default()
        };

        assert_eq!(item.url(), Some("https://blog.example/by-guid"));
        assert_eq!(item.body(), Some("<p>Only description</p>"));
        assert_eq!(item.image(), None);
    }
}
