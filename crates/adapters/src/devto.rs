//! Dev.to public articles API adapter

use async_trait::async_trait;
use postfeed_domain::{AdapterError, ExternalPost, FetchRequest, Platform, PostAdapter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::mapping::{
    AdapterContext, excerpt_from, is_unusable, non_blank, published_or, title_or_default,
};

/// Upper bound Dev.to accepts for `per_page`
const MAX_PER_PAGE: usize = 1000;

/// Dev.to adapter settings
#[derive(Debug, Clone)]
pub struct DevtoSettings {
    pub enabled: bool,
    /// Upper bound on posts requested per call
    pub max_posts: usize,
    pub base_url: String,
    pub username: Option<String>,
    pub tag: Option<String>,
    /// Fixed shuffle seed; random order when unset
    pub shuffle_seed: Option<u64>,
}

impl Default for DevtoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_posts: 30,
            base_url: "https://dev.to".to_string(),
            username: None,
            tag: None,
            shuffle_seed: None,
        }
    }
}

/// Reads published articles from the Dev.to API
pub struct DevtoAdapter {
    ctx: AdapterContext,
    settings: DevtoSettings,
}

impl DevtoAdapter {
    pub fn new(ctx: AdapterContext, settings: DevtoSettings) -> Self {
        Self { ctx, settings }
    }

    fn articles_url(&self, request: &FetchRequest) -> String {
        let per_page = (request.limit * 2).clamp(1, MAX_PER_PAGE);
        let mut url = format!(
            "{}/api/articles?per_page={}",
            self.settings.base_url.trim_end_matches('/'),
            per_page
        );

        if let Some(username) = &self.settings.username {
            url.push_str(&format!("&username={}", urlencoding::encode(username)));
        }

        let tag = request.topic.as_ref().or(self.settings.tag.as_ref());
        if let Some(tag) = tag {
            url.push_str(&format!("&tag={}", urlencoding::encode(tag)));
        }

        url
    }

    fn shuffle(&self, articles: &mut [Article]) {
        match self.settings.shuffle_seed {
            Some(seed) => articles.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => articles.shuffle(&mut rand::rng()),
        }
    }

    fn to_post(&self, index: usize, article: Article) -> ExternalPost {
        let url = article
            .url
            .or(article.canonical_url)
            .unwrap_or_default();
        let (author, author_image) = match article.user {
            Some(user) => (
                non_blank(user.name).or(non_blank(user.username)),
                non_blank(user.profile_image_90).or(non_blank(user.profile_image)),
            ),
            None => (None, None),
        };

        ExternalPost {
            id: self.ctx.ids.make_id(Platform::Devto, index, &url),
            title: title_or_default(article.title.as_deref()),
            excerpt: excerpt_from(article.description.as_deref(), None),
            content: None,
            author,
            author_image,
            author_bio: None,
            published_at: published_or(article.published_at.as_deref(), self.ctx.clock.now()),
            read_time: format!("{} min read", article.reading_time_minutes.unwrap_or(1)),
            tags: article.tag_list.map(TagList::into_vec).unwrap_or_default(),
            category: "Development".to_string(),
            likes: article.public_reactions_count.unwrap_or(0),
            comments: article.comments_count.unwrap_or(0),
            views: 0,
            image: non_blank(article.cover_image).or(non_blank(article.social_image)),
            url,
            source: Platform::Devto,
        }
    }
}

#[derive(Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    canonical_url: Option<String>,
    cover_image: Option<String>,
    social_image: Option<String>,
    published_at: Option<String>,
    reading_time_minutes: Option<u32>,
    tag_list: Option<TagList>,
    public_reactions_count: Option<u64>,
    comments_count: Option<u64>,
    user: Option<User>,
}

/// `tag_list` is an array on list endpoints and a comma string elsewhere
#[derive(Deserialize)]
#[serde(untagged)]
enum TagList {
    List(Vec<String>),
    Joined(String),
}

impl TagList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(tags) => tags,
            TagList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct User {
    name: Option<String>,
    username: Option<String>,
    profile_image: Option<String>,
    profile_image_90: Option<String>,
}

#[async_trait]
impl PostAdapter for DevtoAdapter {
    fn platform(&self) -> Platform {
        Platform::Devto
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

        let url = self.articles_url(request);
        tracing::info!(url = %url, limit = request.limit, "Fetching Dev.to articles");

        let mut articles: Vec<Article> = crate::mapping::fetch_json(&self.ctx.fetcher, &url).await?;
        let fetched = articles.len();

        articles.retain(|a| !is_unusable(a.url.as_deref().or(a.canonical_url.as_deref()), None));
        self.shuffle(&mut articles);
        articles.truncate(request.limit);

        let posts: Vec<ExternalPost> = articles
            .into_iter()
            .enumerate()
            .map(|(index, article)| self.to_post(index, article))
            .collect();

        tracing::info!(fetched, count = posts.len(), "Fetched Dev.to articles");

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::test_context;
    use std::collections::HashSet;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn article(n: u32) -> serde_json::Value {
        serde_json::json!({
            "id": n,
            "title": format!("Article {}", n),
            "description": format!("About article {}", n),
            "url": format!("https://dev.to/someone/article-{}", n),
            "cover_image": null,
            "social_image": format!("https://dev.to/social/{}.png", n),
            "published_at": format!("2024-01-{:02}T10:00:00Z", n),
            "reading_time_minutes": n,
            "tag_list": ["rust", "web"],
            "public_reactions_count": n * 10,
            "comments_count": n,
            "user": {
                "name": "Some One",
                "username": "someone",
                "profile_image_90": "https://dev.to/avatar_90.png"
            }
        })
    }

    fn adapter(base_url: String, seed: Option<u64>) -> DevtoAdapter {
        DevtoAdapter::new(
            test_context(),
            DevtoSettings {
                base_url,
                tag: Some("programming".to_string()),
                shuffle_seed: seed,
                ..DevtoSettings::default()
            },
        )
    }

    #[tokio::test]
    async fn test_fetch_overfetches_and_caps() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .and(query_param("per_page", "8"))
            .and(query_param("tag", "programming"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json((1..=8).map(article).collect::<Vec<_>>()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let posts = adapter(mock_server.uri(), Some(42))
            .fetch_posts(&FetchRequest::new(4))
            .await
            .unwrap();

        assert_eq!(posts.len(), 4);
        let ids: HashSet<_> = posts.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert!(posts.iter().all(|p| p.source == Platform::Devto));
        assert!(posts.iter().all(|p| p.category == "Development"));
    }

    #[tokio::test]
    async fn test_article_mapping() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![article(3)]))
            .mount(&mock_server)
            .await;

        let posts = adapter(mock_server.uri(), None)
            .fetch_posts(&FetchRequest::new(1))
            .await
            .unwrap();

        let post = &posts[0];
        assert_eq!(post.title, "Article 3");
        assert_eq!(post.excerpt, "About article 3");
        assert_eq!(post.read_time, "3 min read");
        assert_eq!(post.likes, 30);
        assert_eq!(post.comments, 3);
        assert_eq!(post.views, 0);
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert_eq!(post.author.as_deref(), Some("Some One"));
        assert_eq!(post.author_image.as_deref(), Some("https://dev.to/avatar_90.png"));
        assert_eq!(post.image.as_deref(), Some("https://dev.to/social/3.png"));
        assert_eq!(post.content, None);
        assert!(post.id.starts_with("devto-"));
        assert_eq!(post.published_at.day(), 3);
    }

    #[tokio::test]
    async fn test_stable_ids_survive_refetch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json((1..=6).map(article).collect::<Vec<_>>()),
            )
            .mount(&mock_server)
            .await;

        let adapter = adapter(mock_server.uri(), None);
        let first = adapter.fetch_posts(&FetchRequest::new(3)).await.unwrap();
        let second = adapter.fetch_posts(&FetchRequest::new(3)).await.unwrap();

        for post in &second {
            if let Some(same) = first.iter().find(|p| p.url == post.url) {
                assert_eq!(same.id, post.id);
            }
        }
    }

    #[tokio::test]
    async fn test_topic_overrides_configured_tag() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .and(query_param("tag", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![article(1)]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let posts = adapter(mock_server.uri(), None)
            .fetch_posts(&FetchRequest::with_topic("rust", 2))
            .await
            .unwrap();

        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults_and_linkless_articles_are_skipped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "url": "https://dev.to/x/bare" },
                { "title": "No link" }
            ])))
            .mount(&mock_server)
            .await;

        let posts = adapter(mock_server.uri(), None)
            .fetch_posts(&FetchRequest::new(5))
            .await
            .unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Untitled post");
        assert_eq!(posts[0].read_time, "1 min read");
        assert!(posts[0].tags.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_request_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = adapter(mock_server.uri(), None)
            .fetch_posts(&FetchRequest::new(2))
            .await;

        assert!(matches!(result, Err(AdapterError::Request(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_format_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&mock_server)
            .await;

        let result = adapter(mock_server.uri(), None)
            .fetch_posts(&FetchRequest::new(2))
            .await;

        assert!(matches!(result, Err(AdapterError::InvalidFormat(_))));
    }
}
