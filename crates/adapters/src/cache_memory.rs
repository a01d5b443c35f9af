//! In-memory TTL cache for adapter output

use async_trait::async_trait;
use postfeed_domain::{CacheError, CacheKey, Clock, ExternalPost, PostCache, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use time::OffsetDateTime;

struct Entry {
    stored_at: OffsetDateTime,
    posts: Vec<ExternalPost>,
}

/// Process-local cache; entries expire after `ttl` and the oldest entry is
/// evicted once `max_entries` is exceeded
pub struct InMemoryPostCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl InMemoryPostCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry, now: OffsetDateTime) -> bool {
        now - entry.stored_at >= self.ttl
    }
}

#[async_trait]
impl PostCache for InMemoryPostCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<ExternalPost>>, CacheError> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !self.is_expired(entry, now) => return Ok(Some(entry.posts.clone())),
            Some(_) => {}
        }

        entries.remove(key);
        tracing::debug!(key = %key, "Cache entry expired");
        Ok(None)
    }

    async fn put(&self, key: CacheKey, posts: Vec<ExternalPost>) -> Result<(), CacheError> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        entries.insert(
            key,
            Entry {
                stored_at: now,
                posts,
            },
        );

        while entries.len() > self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(oldest) => {
                    tracing::debug!(key = %oldest, "Evicting oldest cache entry");
                    entries.remove(&oldest);
                }
                None => break,
            }
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?
            .clear();
        Ok(())
    }
}
