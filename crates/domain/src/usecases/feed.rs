//! Accessor layer - observable loading state for a presentation layer

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tokio::sync::watch;

use crate::{model::ExternalPost, ports::PostProvider};

/// Load status of a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// What a consumer sees at any point in time
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub posts: Vec<ExternalPost>,
    pub loading: bool,
    pub error: Option<String>,
    pub status: FeedStatus,
}

impl FeedSnapshot {
    fn idle() -> Self {
        Self {
            posts: vec![],
            loading: false,
            error: None,
            status: FeedStatus::Idle,
        }
    }
}

/// Wraps a `PostProvider` and publishes `(posts, loading, error)` snapshots.
///
/// Loads happen on `mount`, on a changed limit and on `refetch`. Results that
/// arrive after `unmount` or after a newer load started are dropped.
pub struct ExternalPostsFeed<P: PostProvider + ?Sized> {
    provider: Arc<P>,
    state: watch::Sender<FeedSnapshot>,
    limit: AtomicUsize,
    generation: AtomicU64,
    mounted: AtomicBool,
}

impl<P: PostProvider + ?Sized> ExternalPostsFeed<P> {
    pub fn new(provider: Arc<P>, limit: usize) -> Self {
        let (state, _) = watch::channel(FeedSnapshot::idle());
        Self {
            provider,
            state,
            limit: AtomicUsize::new(limit),
            generation: AtomicU64::new(0),
            mounted: AtomicBool::new(false),
        }
    }

    /// Current state
    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.subscribe()
    }

    pub fn limit(&self) -> usize {
        self.limit.load(Ordering::SeqCst)
    }

    /// Start observing and run the first load
    pub async fn mount(&self) {
        self.mounted.store(true, Ordering::SeqCst);
        self.load().await;
    }

    /// Reload only when the limit actually changes
    pub async fn set_limit(&self, limit: usize) {
        if self.limit.swap(limit, Ordering::SeqCst) == limit {
            return;
        }
        if self.mounted.load(Ordering::SeqCst) {
            self.load().await;
        }
    }

    /// Explicit reload
    pub async fn refetch(&self) {
        if !self.mounted.load(Ordering::SeqCst) {
            tracing::debug!("Refetch on unmounted feed ignored");
            return;
        }
        self.load().await;
    }

    /// Stop publishing; in-flight results are discarded
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    async fn load(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let limit = self.limit();

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.status = FeedStatus::Loading;
        });

        let result = self.provider.load_posts(limit).await;

        if !self.mounted.load(Ordering::SeqCst)
            || self.generation.load(Ordering::SeqCst) != generation
        {
            tracing::debug!(generation, "Discarding stale feed result");
            return;
        }

        let next = match result {
            Ok(posts) => {
                tracing::debug!(count = posts.len(), limit, "Feed loaded");
                FeedSnapshot {
                    posts,
                    loading: false,
                    error: None,
                    status: FeedStatus::Success,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Feed load failed");
                FeedSnapshot {
                    posts: vec![],
                    loading: false,
                    error: Some(e.to_string()),
                    status: FeedStatus::Error,
                }
            }
        };

        self.state.send_replace(next);
    }
}
