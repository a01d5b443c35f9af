//! Normalization helpers shared by the platform adapters

use postfeed_domain::usecases::ProxyFetcher;
use postfeed_domain::{
    AdapterError, Clock, IdStrategy, PostIdFactory, SystemClock, parse_published_at,
    plain_text_excerpt,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use time::OffsetDateTime;

/// Collaborators every platform adapter needs
#[derive(Clone)]
pub struct AdapterContext {
    pub fetcher: Arc<ProxyFetcher>,
    pub ids: PostIdFactory,
    pub clock: Arc<dyn Clock>,
}

impl AdapterContext {
    pub fn new(fetcher: Arc<ProxyFetcher>, ids: PostIdFactory, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            ids,
            clock,
        }
    }

    /// System clock with the given ID strategy
    pub fn with_strategy(fetcher: Arc<ProxyFetcher>, strategy: IdStrategy) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::new(fetcher, PostIdFactory::new(strategy, clock.clone()), clock)
    }
}

pub(crate) const EXCERPT_CHARS: usize = 150;
pub(crate) const UNTITLED: &str = "Untitled post";

/// Title, or the placeholder when the platform sent none
pub(crate) fn title_or_default(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => UNTITLED.to_string(),
    }
}

/// Provided summary when present, otherwise the stripped and truncated body
pub(crate) fn excerpt_from(summary: Option<&str>, body: Option<&str>) -> String {
    let source = summary
        .filter(|s| !s.trim().is_empty())
        .or(body)
        .unwrap_or_default();
    plain_text_excerpt(source, EXCERPT_CHARS)
}

/// Parsed publication date, or `fallback` when missing or unparseable
pub(crate) fn published_or(raw: Option<&str>, fallback: OffsetDateTime) -> OffsetDateTime {
    raw.and_then(parse_published_at).unwrap_or(fallback)
}

/// A post with neither a link nor a body cannot be rendered
pub(crate) fn is_unusable(url: Option<&str>, content: Option<&str>) -> bool {
    let blank = |v: Option<&str>| v.is_none_or(|s| s.trim().is_empty());
    blank(url) && blank(content)
}

/// Sanitized body; falls back to the raw HTML when sanitizing emptied it
/// and there is no link to show instead
pub(crate) fn content_or_raw(sanitized: String, raw: &str, url: &str) -> Option<String> {
    if !sanitized.trim().is_empty() {
        Some(sanitized)
    } else if url.trim().is_empty() && !raw.trim().is_empty() {
        Some(raw.to_string())
    } else {
        None
    }
}

/// Non-blank string
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET `url` through the proxy chain and decode JSON
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    fetcher: &ProxyFetcher,
    url: &str,
) -> Result<T, AdapterError> {
    let response = fetcher
        .fetch_with_proxy(url)
        .await
        .map_err(|e| AdapterError::Request(e.to_string()))?;

    serde_json::from_str(&response.body).map_err(|e| AdapterError::InvalidFormat(e.to_string()))
}

#[cfg(test)]
pub(crate) fn test_context() -> AdapterContext {
    let client = crate::http::ReqwestHttpClient::new(std::time::Duration::from_secs(5))
        .expect("http client");
    AdapterContext::with_strategy(
        Arc::new(ProxyFetcher::direct(Arc::new(client))),
        IdStrategy::Stable,
    )
}
