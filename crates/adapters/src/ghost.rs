//! Ghost Content API adapter

use async_trait::async_trait;
use postfeed_domain::{
    AdapterError, ContentSanitizer, ExternalPost, FetchRequest, Platform, PostAdapter,
    SanitizeContext,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::mapping::{
    AdapterContext, content_or_raw, excerpt_from, fetch_json, is_unusable, non_blank, published_or,
    title_or_default,
};

const CATEGORY: &str = "Blog";

/// Ghost adapter settings
#[derive(Debug)]
pub struct GhostSettings {
    pub enabled: bool,
    /// Upper bound on posts requested per call
    pub max_posts: usize,
    /// Site root, e.g. `https://blog.example.com`
    pub url: Option<String>,
    pub content_key: Option<SecretString>,
    /// Tag slug used when no topic is requested
    pub tag: Option<String>,
}

impl Default for GhostSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_posts: 20,
            url: None,
            content_key: None,
            tag: None,
        }
    }
}

/// Reads posts from a Ghost site's Content API
pub struct GhostAdapter {
    ctx: AdapterContext,
    sanitizer: ContentSanitizer,
    settings: GhostSettings,
}

impl GhostAdapter {
    pub fn new(ctx: AdapterContext, settings: GhostSettings) -> Self {
        Self {
            ctx,
            sanitizer: ContentSanitizer::new(),
            settings,
        }
    }

    fn posts_url(&self, request: &FetchRequest) -> Result<String, AdapterError> {
        let site = self
            .settings
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AdapterError::Config("Ghost url is not set".to_string()))?;
        let key = self
            .settings
            .content_key
            .as_ref()
            .ok_or_else(|| AdapterError::Config("Ghost content key is not set".to_string()))?;

        let mut url = format!(
            "{}/ghost/api/content/posts/?key={}&limit={}&include=tags,authors",
            site.trim_end_matches('/'),
            urlencoding::encode(key.expose_secret()),
            request.limit
        );

        let tag = request.topic.as_ref().or(self.settings.tag.as_ref());
        if let Some(tag) = tag {
            url.push_str(&format!("&filter={}", urlencoding::encode(&format!("tag:{}", tag))));
        }

        Ok(url)
    }

    fn to_post(&self, index: usize, post: GhostPost) -> Option<ExternalPost> {
        let url = post.url.clone().unwrap_or_default();
        if is_unusable(Some(&url), post.html.as_deref()) {
            tracing::debug!(title = ?post.title, "Skipping Ghost post without link or body");
            return None;
        }

        let title = title_or_default(post.title.as_deref());
        let author = post.primary_author.unwrap_or_default();
        let author_name = non_blank(author.name);
        let image = non_blank(post.feature_image);

        let content = post
            .html
            .as_deref()
            .and_then(|html| {
                let sanitized = self.sanitizer.sanitize(
                    html,
                    &SanitizeContext {
                        title: &title,
                        author: author_name.as_deref(),
                        cover_image: image.as_deref(),
                    },
                );
                content_or_raw(sanitized, html, &url)
            });

        let summary = post.custom_excerpt.or(post.excerpt);
        let category = post
            .primary_tag
            .and_then(|t| non_blank(t.name))
            .unwrap_or_else(|| CATEGORY.to_string());
        let identity = if url.is_empty() { &title } else { &url };

        Some(ExternalPost {
            id: self.ctx.ids.make_id(Platform::Ghost, index, identity),
            excerpt: excerpt_from(summary.as_deref(), post.html.as_deref()),
            content,
            author: author_name,
            author_image: non_blank(author.profile_image),
            author_bio: non_blank(author.bio),
            published_at: published_or(post.published_at.as_deref(), self.ctx.clock.now()),
            read_time: format!("{} min read", post.reading_time.unwrap_or(1).max(1)),
            tags: post.tags.into_iter().filter_map(|t| non_blank(t.name)).collect(),
            category,
            likes: 0,
            comments: 0,
            views: 0,
            image,
            url,
            title,
            source: Platform::Ghost,
        })
    }
}

#[derive(Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<GhostPost>,
}

#[derive(Deserialize)]
struct GhostPost {
    title: Option<String>,
    url: Option<String>,
    html: Option<String>,
    excerpt: Option<String>,
    custom_excerpt: Option<String>,
    feature_image: Option<String>,
    published_at: Option<String>,
    reading_time: Option<u32>,
    #[serde(default)]
    tags: Vec<Named>,
    primary_tag: Option<Named>,
    primary_author: Option<Author>,
}

#[derive(Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct Author {
    name: Option<String>,
    profile_image: Option<String>,
    bio: Option<String>,
}

#[async_trait]
impl PostAdapter for GhostAdapter {
    fn platform(&self) -> Platform {
        Platform::Ghost
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

        let url = self.posts_url(request)?;
        // The URL carries the content key; log the site only
        tracing::info!(site = ?self.settings.url, limit = request.limit, topic = ?request.topic, "Fetching Ghost posts");

        let response: PostsResponse = fetch_json(&self.ctx.fetcher, &url).await?;
        let posts: Vec<ExternalPost> = response
            .posts
            .into_iter()
            .enumerate()
            .filter_map(|(index, post)| self.to_post(index, post))
            .take(request.limit)
            .collect();

        tracing::info!(count = posts.len(), "Fetched Ghost posts");

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::test_context;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(site: Option<String>) -> GhostAdapter {
        GhostAdapter::new(
            test_context(),
            GhostSettings {
                enabled: true,
                url: site,
                content_key: Some(SecretString::new("content-key".into())),
                ..GhostSettings::default()
            },
        )
    }

    fn posts_body() -> serde_json::Value {
        serde_json::json!({
            "posts": [{
                "id": "65f",
                "title": "Shipping a Rust CLI",
                "url": "https://blog.example.com/shipping-a-rust-cli/",
                "html": "<p>Release notes</p><a class=\"share-button\" href=\"#\">Share</a>",
                "custom_excerpt": "How we ship",
                "feature_image": "https://blog.example.com/content/images/cover.jpg",
                "published_at": "2024-04-20T15:00:00.000+00:00",
                "reading_time": 7,
                "tags": [{ "name": "rust" }, { "name": "cli" }],
                "primary_tag": { "name": "Engineering" },
                "primary_author": {
                    "name": "Editor",
                    "profile_image": "https://blog.example.com/editor.png",
                    "bio": "Writes things"
                }
            }],
            "meta": { "pagination": { "page": 1 } }
        })
    }

    #[tokio::test]
    async fn test_fetch_posts_maps_content_api_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ghost/api/content/posts/"))
            .and(query_param("key", "content-key"))
            .and(query_param("limit", "3"))
            .and(query_param("include", "tags,authors"))
            .and(query_param("filter", "tag:rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(posts_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let posts = adapter(Some(mock_server.uri()))
            .fetch_posts(&FetchRequest::with_topic("rust", 3))
            .await
            .unwrap();

        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.source, Platform::Ghost);
        assert_eq!(post.excerpt, "How we ship");
        assert_eq!(post.read_time, "7 min read");
        assert_eq!(post.category, "Engineering");
        assert_eq!(post.tags, vec!["rust", "cli"]);
        assert_eq!(post.author_bio.as_deref(), Some("Writes things"));
        assert_eq!(post.content.as_deref(), Some("<p>Release notes</p>Share"));
        assert_eq!(post.published_at.hour(), 15);
    }

    #[tokio::test]
    async fn test_missing_site_is_config_error() {
        let result = adapter(None).fetch_posts(&FetchRequest::new(3)).await;
        assert!(matches!(result, Err(AdapterError::Config(_))));
    }

    #[tokio::test]
    async fn test_unauthorized_key_is_request_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result = adapter(Some(mock_server.uri()))
            .fetch_posts(&FetchRequest::new(3))
            .await;

        assert!(matches!(result, Err(AdapterError::Request(_))));
    }

    #[test]
    fn test_disabled_by_default() {
        let adapter = GhostAdapter::new(test_context(), GhostSettings::default());
        assert!(!adapter.is_enabled());
    }
}
