//! Time-bounded caching of adapter output

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    model::{ExternalPost, FetchRequest, Platform},
    ports::{AdapterError, PostAdapter, PostCache},
};

/// Adapter decorator that serves repeated selectors from a `PostCache`
pub struct CachedAdapter {
    inner: Arc<dyn PostAdapter>,
    cache: Arc<dyn PostCache>,
}

impl CachedAdapter {
    pub fn new(inner: Arc<dyn PostAdapter>, cache: Arc<dyn PostCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl PostAdapter for CachedAdapter {
    fn platform(&self) -> Platform {
        self.inner.platform()
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn supports_topics(&self) -> bool {
        self.inner.supports_topics()
    }

    async fn fetch_posts(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<ExternalPost>, AdapterError> {
        let key = request.cache_key(self.inner.platform());

        match self.cache.get(&key).await {
            Ok(Some(posts)) => {
                tracing::debug!(key = %key, count = posts.len(), "Cache hit");
                return Ok(posts);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, fetching");
            }
        }

        let posts = self.inner.fetch_posts(request).await?;

        // Outages come back empty; keep them out of the cache
        if !posts.is_empty() {
            if let Err(e) = self.cache.put(key.clone(), posts.clone()).await {
                tracing::warn!(key = %key, error = %e, "Cache write failed");
            }
        }

        Ok(posts)
    }
}
