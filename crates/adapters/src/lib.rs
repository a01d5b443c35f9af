//! postfeed adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `net`: reqwest HTTP client (and a canned stub)
//! - `platforms`: Dev.to, Hashnode, Medium and Ghost adapters
//! - `rss2json`: RSS-to-JSON conversion used by the feed-based platforms
//! - `cache`: In-memory TTL cache
//! - `local`: Filesystem loader for site-authored posts

mod cache_memory;
mod devto;
mod ghost;
mod hashnode;
mod http;
mod local_fs;
mod mapping;
mod medium;

pub mod rss2json;

pub use mapping::AdapterContext;

/// Re-exports for HTTP clients
pub mod net {
    pub use crate::http::{ReqwestHttpClient, StubHttpClient};
}

/// Re-exports for platform adapters
pub mod platforms {
    pub use crate::devto::{DevtoAdapter, DevtoSettings};
    pub use crate::ghost::{GhostAdapter, GhostSettings};
    pub use crate::hashnode::{HashnodeAdapter, HashnodeSettings};
    pub use crate::medium::{MediumAdapter, MediumSettings, tag_feed_url};
}

/// Re-exports for cache adapters
pub mod cache {
    pub use crate::cache_memory::InMemoryPostCache;
}

/// Re-exports for local post repositories
pub mod local {
    pub use crate::local_fs::FsLocalPostsRepo;
}
