//! Medium adapter: tag or publication RSS feeds through rss2json

use async_trait::async_trait;
use postfeed_domain::{
    AdapterError, ContentSanitizer, ExternalPost, FeedRotation, FetchRequest, Platform,
    PostAdapter, SanitizeContext,
};
use std::sync::Arc;

use crate::mapping::{
    AdapterContext, content_or_raw, excerpt_from, is_unusable, published_or, title_or_default,
};
use crate::rss2json::{FeedItem, Rss2JsonClient};

const READ_TIME: &str = "5 min read";
const CATEGORY: &str = "Technology";
const DEFAULT_TAG: &str = "Medium";

/// Medium adapter settings
#[derive(Debug, Clone)]
pub struct MediumSettings {
    pub enabled: bool,
    /// Upper bound on posts requested per call
    pub max_posts: usize,
    /// Explicit feed; used when no topic is requested
    pub feed_url: Option<String>,
    /// Tags rotated through when neither a topic nor a feed URL is given
    pub topics: Vec<String>,
    pub rotation_seed: Option<u64>,
}

impl Default for MediumSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_posts: 20,
            feed_url: None,
            topics: vec![
                "programming".to_string(),
                "software-engineering".to_string(),
                "web-development".to_string(),
            ],
            rotation_seed: None,
        }
    }
}

/// Medium tag feed URL
pub fn tag_feed_url(topic: &str) -> String {
    format!(
        "https://medium.com/feed/tag/{}",
        urlencoding::encode(&topic.trim().to_lowercase())
    )
}

/// Reads Medium feeds; no engagement data is available
pub struct MediumAdapter {
    ctx: AdapterContext,
    rss: Arc<Rss2JsonClient>,
    sanitizer: ContentSanitizer,
    rotation: FeedRotation,
    settings: MediumSettings,
}

impl MediumAdapter {
    pub fn new(ctx: AdapterContext, rss: Arc<Rss2JsonClient>, settings: MediumSettings) -> Self {
        Self {
            ctx,
            rss,
            sanitizer: ContentSanitizer::new(),
            rotation: FeedRotation::from_seed(settings.rotation_seed),
            settings,
        }
    }

    fn feed_for(&self, request: &FetchRequest) -> Result<String, AdapterError> {
        if let Some(topic) = &request.topic {
            return Ok(tag_feed_url(topic));
        }
        if let Some(feed_url) = &self.settings.feed_url {
            return Ok(feed_url.clone());
        }
        self.rotation
            .next(&self.settings.topics)
            .map(tag_feed_url)
            .ok_or_else(|| AdapterError::Config("No Medium feed or topics configured".to_string()))
    }

    fn to_post(&self, index: usize, item: FeedItem) -> Option<ExternalPost> {
        let url = item.url().unwrap_or_default().to_string();
        let raw = item.body();

        if is_unusable(Some(&url), raw) {
            tracing::debug!(title = ?item.title, "Skipping Medium item without link or body");
            return None;
        }

        let title = title_or_default(item.title.as_deref());
        let author = item.author.clone().filter(|a| !a.trim().is_empty());
        let image = item.image().map(String::from);

        let content = raw.and_then(|html| {
            let sanitized = self.sanitizer.sanitize(
                html,
                &SanitizeContext {
                    title: &title,
                    author: author.as_deref(),
                    cover_image: image.as_deref(),
                },
            );
            content_or_raw(sanitized, html, &url)
        });

        let identity = if url.is_empty() { &title } else { &url };

        Some(ExternalPost {
            id: self.ctx.ids.make_id(Platform::Medium, index, identity),
            excerpt: excerpt_from(None, raw),
            content,
            author,
            author_image: None,
            author_bio: None,
            published_at: published_or(item.pub_date.as_deref(), self.ctx.clock.now()),
            read_time: READ_TIME.to_string(),
            tags: if item.categories.is_empty() {
                vec![DEFAULT_TAG.to_string()]
            } else {
                item.categories.clone()
            },
            category: CATEGORY.to_string(),
            likes: 0,
            comments: 0,
            views: 0,
            image,
            url,
            title,
            source: Platform::Medium,
        })
    }
}

#[async_trait]
impl PostAdapter for MediumAdapter {
    fn platform(&self) -> Platform {
        Platform::Medium
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn supports_topics(&self) -> bool {
        true
    }

    async fn fetch_posts(&self, request: &FetchRequest) -> Result<Vec<ExternalPost>, AdapterError> {
        let request = &request.capped(self.settings.max_posts);
        if request.limit == 0 {
            return Ok(vec![]);
        }

        let feed = self.feed_for(request)?;
        tracing::info!(feed = %feed, limit = request.limit, "Fetching Medium feed");

        let items = self.rss.fetch_items(&feed).await?;
        let posts: Vec<ExternalPost> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| self.to_post(index, item))
            .take(request.limit)
            .collect();

        tracing::info!(feed = %feed, count = posts.len(), "Fetched Medium posts");

        Ok(posts)
    }
}
