//! Domain models and value objects

use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::ports::Clock;

/// Platform a post originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Devto,
    Hashnode,
    Medium,
    Ghost,
    Local,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Devto,
        Platform::Hashnode,
        Platform::Medium,
        Platform::Ghost,
        Platform::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Devto => "devto",
            Platform::Hashnode => "hashnode",
            Platform::Medium => "medium",
            Platform::Ghost => "ghost",
            Platform::Local => "local",
        }
    }

    /// Whether posts from this platform already carry their full HTML body
    pub fn embeds_full_content(&self) -> bool {
        !matches!(self, Platform::Devto)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}

/// A post fetched from a third-party platform, normalized to one shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPost {
    /// Identifier, unique within one aggregation
    pub id: String,
    pub title: String,
    /// Provided summary or stripped and truncated body
    pub excerpt: String,
    /// HTML body, when the platform delivers one
    pub content: Option<String>,
    pub author: Option<String>,
    pub author_image: Option<String>,
    pub author_bio: Option<String>,
    /// Publish date from the originating platform (sort key)
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub read_time: String,
    pub tags: Vec<String>,
    /// Coarse display grouping assigned per adapter
    pub category: String,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    /// Cover image URL
    pub image: Option<String>,
    /// Canonical link to the original article
    pub url: String,
    pub source: Platform,
}

impl ExternalPost {
    /// A post can be rendered when it links somewhere or carries a body
    pub fn is_renderable(&self) -> bool {
        !self.url.trim().is_empty()
            || self
                .content
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty())
    }
}

/// A statically authored post bundled with the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPost {
    pub id: u32,
    pub title: String,
    pub excerpt: String,
    /// Full HTML content
    pub content: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub read_time: String,
    pub tags: Vec<String>,
    pub category: String,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub image: Option<String>,
}

/// Selector handed to an adapter for one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Topic/tag filter, for adapters that support it
    pub topic: Option<String>,
    /// Maximum number of posts wanted
    pub limit: usize,
}

impl FetchRequest {
    pub fn new(limit: usize) -> Self {
        Self { topic: None, limit }
    }

    pub fn with_topic(topic: impl Into<String>, limit: usize) -> Self {
        Self {
            topic: Some(topic.into()),
            limit,
        }
    }

    /// Same selector with the limit bounded by `max`
    pub fn capped(&self, max: usize) -> Self {
        Self {
            topic: self.topic.clone(),
            limit: self.limit.min(max),
        }
    }

    /// Cache key for this request against a platform
    pub fn cache_key(&self, platform: Platform) -> CacheKey {
        let selector = match &self.topic {
            Some(topic) => format!("topic={};limit={}", topic.to_lowercase(), self.limit),
            None => format!("limit={}", self.limit),
        };
        CacheKey { platform, selector }
    }
}

/// Key for cached adapter output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub platform: Platform,
    pub selector: String,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.selector)
    }
}

/// How post identifiers are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Hash of the canonical URL, stable across fetches
    #[default]
    Stable,
    /// Position, timestamp and random suffix; changes on every fetch
    PerFetch,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stable" => Ok(IdStrategy::Stable),
            "per_fetch" => Ok(IdStrategy::PerFetch),
            other => Err(format!("Invalid id strategy: {}", other)),
        }
    }
}

/// Builds post identifiers for adapters
#[derive(Clone)]
pub struct PostIdFactory {
    strategy: IdStrategy,
    clock: Arc<dyn Clock>,
}

impl PostIdFactory {
    pub fn new(strategy: IdStrategy, clock: Arc<dyn Clock>) -> Self {
        Self { strategy, clock }
    }

    /// Identifier for the post at `index` in a platform's response
    pub fn make_id(&self, platform: Platform, index: usize, url: &str) -> String {
        match self.strategy {
            IdStrategy::Stable => format!("{}-{}", platform, &url_digest(url)[..12]),
            IdStrategy::PerFetch => {
                let millis = self.clock.now().unix_timestamp_nanos() / 1_000_000;
                let suffix = Alphanumeric
                    .sample_string(&mut rand::rng(), 6)
                    .to_lowercase();
                format!("{}-{}-{}-{}", platform, index, millis, suffix)
            }
        }
    }
}

impl fmt::Debug for PostIdFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostIdFactory")
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Hex SHA-256 of a URL
pub fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Parse the date formats the supported platforms emit
pub fn parse_published_at(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
        return Some(dt);
    }

    let space_separated = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, space_separated) {
        return Some(dt.assume_utc());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(raw, date_only)
        .ok()
        .map(|d| d.midnight().assume_utc())
}
