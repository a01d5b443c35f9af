//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{CacheKey, ExternalPost, FetchRequest, LocalPost, Platform};

/// Raw response of an HTTP GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type for HTTP client operations
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout")]
    Timeout,
    #[error("Failed to read body: {0}")]
    Body(String),
}

/// Port for outbound, unauthenticated GET requests
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET; non-2xx statuses are returned, not errors
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}

/// Error type for adapter operations
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("API returned status {0}")]
    Status(u16),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Feed converter error: {0}")]
    Converter(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Port for a third-party content platform
#[async_trait]
pub trait PostAdapter: Send + Sync {
    /// Platform every returned post is tagged with
    fn platform(&self) -> Platform;

    /// Check if this adapter is enabled
    fn is_enabled(&self) -> bool;

    /// Whether `FetchRequest::topic` is honoured
    fn supports_topics(&self) -> bool;

    /// Fetch up to `request.limit` normalized posts
    async fn fetch_posts(&self, request: &FetchRequest)
    -> Result<Vec<ExternalPost>, AdapterError>;
}

/// Error type for cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Port for caching normalized adapter output
#[async_trait]
pub trait PostCache: Send + Sync {
    /// Get a live (non-expired) entry
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<ExternalPost>>, CacheError>;

    /// Store an entry
    async fn put(&self, key: CacheKey, posts: Vec<ExternalPost>) -> Result<(), CacheError>;

    /// Drop every entry
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Error type for local posts repository
#[derive(Debug, Error)]
pub enum LocalPostsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },
    #[error("Duplicate ID {id} in files: {files:?}")]
    DuplicateId { id: u32, files: Vec<String> },
}

/// Port for loading statically authored posts
#[async_trait]
pub trait LocalPostsRepo: Send + Sync {
    /// Load all local posts
    async fn load(&self) -> Result<Vec<LocalPost>, LocalPostsError>;
}

/// Error type for post providers
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Aggregation failed: {0}")]
    Aggregation(String),
}

/// Port the accessor layer pulls external posts through
#[async_trait]
pub trait PostProvider: Send + Sync {
    async fn load_posts(&self, limit: usize) -> Result<Vec<ExternalPost>, ProviderError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
