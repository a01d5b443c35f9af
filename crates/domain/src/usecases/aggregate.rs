//! Aggregation use case - fans out to every platform adapter and merges the results

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::{
    model::{ExternalPost, FetchRequest, Platform},
    ports::{PostAdapter, PostProvider, ProviderError},
    sanitize::{ContentSanitizer, SanitizeContext, extract_article_region},
    usecases::proxy::ProxyFetcher,
};

/// Configuration for the aggregation service
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Cap for the broad aggregation behind `get_post_by_id`
    pub lookup_limit: usize,
    /// Upper bound on a single adapter call (None = wait indefinitely)
    pub adapter_timeout: Option<Duration>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            lookup_limit: 100,
            adapter_timeout: Some(Duration::from_secs(20)),
        }
    }
}

/// Single entry point for freshly fetched external posts
pub struct AggregationService {
    adapters: Vec<Arc<dyn PostAdapter>>,
    fetcher: Arc<ProxyFetcher>,
    sanitizer: ContentSanitizer,
    config: AggregationConfig,
    last_result: RwLock<Vec<ExternalPost>>,
}

impl AggregationService {
    pub fn new(
        adapters: Vec<Arc<dyn PostAdapter>>,
        fetcher: Arc<ProxyFetcher>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            adapters,
            fetcher,
            sanitizer: ContentSanitizer::new(),
            config,
            last_result: RwLock::new(Vec::new()),
        }
    }

    /// Platforms whose adapters are enabled
    pub fn enabled_platforms(&self) -> Vec<Platform> {
        self.adapters
            .iter()
            .filter(|a| a.is_enabled())
            .map(|a| a.platform())
            .collect()
    }

    /// Merged, date-sorted posts from every enabled adapter, at most `limit`
    pub async fn get_all_external_posts(&self, limit: usize) -> Vec<ExternalPost> {
        let adapters: Vec<_> = self.adapters.iter().filter(|a| a.is_enabled()).collect();
        self.aggregate(&adapters, None, limit).await
    }

    /// Same as `get_all_external_posts`, restricted to topic-aware adapters
    pub async fn get_posts_by_topic(&self, topic: &str, limit: usize) -> Vec<ExternalPost> {
        let adapters: Vec<_> = self
            .adapters
            .iter()
            .filter(|a| a.is_enabled() && a.supports_topics())
            .collect();
        self.aggregate(&adapters, Some(topic), limit).await
    }

    /// Look a post up by ID: last aggregation first, then a broad re-aggregation
    pub async fn get_post_by_id(&self, id: &str) -> Option<ExternalPost> {
        if let Some(post) = self.find_in_last_result(id) {
            return Some(post);
        }

        tracing::debug!(id = %id, lookup_limit = self.config.lookup_limit, "Post not in last result, re-aggregating");

        self.get_all_external_posts(self.config.lookup_limit)
            .await
            .into_iter()
            .find(|p| p.id == id)
    }

    /// Sanitized HTML body for a post, or an empty string when only a link
    /// to the original can be shown
    pub async fn fetch_post_content(&self, post: &ExternalPost) -> String {
        let ctx = SanitizeContext::from(post);

        if post.source.embeds_full_content() {
            if let Some(content) = post.content.as_deref().filter(|c| !c.trim().is_empty()) {
                return self.sanitizer.sanitize(content, &ctx);
            }
        }

        if post.url.trim().is_empty() {
            return String::new();
        }

        match self.fetcher.fetch_with_proxy(&post.url).await {
            Ok(response) => match extract_article_region(&response.body) {
                Some(region) => self.sanitizer.sanitize(&region, &ctx),
                None => {
                    tracing::debug!(url = %post.url, "No content region found in article page");
                    String::new()
                }
            },
            Err(e) => {
                tracing::warn!(url = %post.url, error = %e, "Failed to fetch article page");
                String::new()
            }
        }
    }

    async fn aggregate(
        &self,
        adapters: &[&Arc<dyn PostAdapter>],
        topic: Option<&str>,
        limit: usize,
    ) -> Vec<ExternalPost> {
        if limit == 0 || adapters.is_empty() {
            tracing::debug!(limit, adapters = adapters.len(), "Nothing to aggregate");
            return vec![];
        }

        let per_adapter = limit.div_ceil(adapters.len());
        let request = match topic {
            Some(topic) => FetchRequest::with_topic(topic, per_adapter),
            None => FetchRequest::new(per_adapter),
        };

        tracing::info!(
            adapters = adapters.len(),
            per_adapter,
            topic = ?topic,
            "Aggregating external posts"
        );

        let fan_out = join_all(
            adapters
                .iter()
                .map(|adapter| self.fetch_guarded(adapter.as_ref(), &request)),
        );

        // Last resort; adapter panics are already caught per call
        let batches = match AssertUnwindSafe(fan_out).catch_unwind().await {
            Ok(batches) => batches,
            Err(_) => {
                tracing::error!("Adapter fan-out panicked, returning no posts");
                return vec![];
            }
        };

        let merged = merge_posts(batches, limit);

        tracing::info!(count = merged.len(), "Aggregated external posts");

        if let Ok(mut last) = self.last_result.write() {
            *last = merged.clone();
        }

        merged
    }

    /// Run one adapter; every failure becomes an empty batch
    async fn fetch_guarded(
        &self,
        adapter: &dyn PostAdapter,
        request: &FetchRequest,
    ) -> Vec<ExternalPost> {
        let platform = adapter.platform();
        let call = AssertUnwindSafe(adapter.fetch_posts(request)).catch_unwind();

        let outcome = match self.config.adapter_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(platform = %platform, timeout = ?limit, "Adapter timed out");
                    return vec![];
                }
            },
            None => call.await,
        };

        let Ok(result) = outcome else {
            tracing::error!(platform = %platform, "Adapter panicked, skipping");
            return vec![];
        };

        match result {
            Ok(mut posts) => {
                posts.retain(ExternalPost::is_renderable);
                posts.truncate(request.limit);
                tracing::debug!(platform = %platform, count = posts.len(), "Adapter returned posts");
                posts
            }
            Err(e) => {
                tracing::warn!(platform = %platform, error = %e, "Adapter failed, skipping");
                vec![]
            }
        }
    }

    fn find_in_last_result(&self, id: &str) -> Option<ExternalPost> {
        self.last_result
            .read()
            .ok()
            .and_then(|last| last.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl PostProvider for AggregationService {
    async fn load_posts(&self, limit: usize) -> Result<Vec<ExternalPost>, ProviderError> {
        Ok(self.get_all_external_posts(limit).await)
    }
}

/// Flatten batches, drop repeated URLs/IDs (first wins), sort newest first
/// (stable) and keep at most `limit`
pub fn merge_posts(batches: Vec<Vec<ExternalPost>>, limit: usize) -> Vec<ExternalPost> {
    let mut seen_urls = HashSet::new();
    let mut seen_ids = HashSet::new();

    let mut merged: Vec<ExternalPost> = batches
        .into_iter()
        .flatten()
        .filter(|post| {
            let url = post.url.trim().trim_end_matches('/').to_string();
            let fresh_url = url.is_empty() || seen_urls.insert(url);
            fresh_url && seen_ids.insert(post.id.clone())
        })
        .collect();

    merged.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    merged.truncate(limit);
    merged
}
