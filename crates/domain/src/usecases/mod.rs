//! Application use cases

pub mod aggregate;
pub mod cache;
pub mod feed;
pub mod listing;
pub mod proxy;

pub use aggregate::{AggregationConfig, AggregationService, merge_posts};
pub use cache::CachedAdapter;
pub use feed::{ExternalPostsFeed, FeedSnapshot, FeedStatus};
pub use listing::{BlogListing, ListingPost};
pub use proxy::{ProxyExhaustedError, ProxyFetcher, URL_PLACEHOLDER, proxied_url};
