//! postfeed domain crate
//!
//! This crate contains the core aggregation logic following hexagonal architecture:
//! - `model`: Posts, platforms, request selectors and post identity
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `sanitize`: Scrubbing of third-party article HTML
//! - `rotation`: Feed selection for adapters that read one feed per call
//! - `usecases`: Proxy fallback, aggregation, caching, accessor feed and listing

pub mod model;
pub mod ports;
pub mod rotation;
pub mod sanitize;
pub mod usecases;

#[cfg(test)]
mod fixtures;

pub use model::*;
pub use ports::*;
pub use rotation::FeedRotation;
pub use sanitize::{ContentSanitizer, SanitizeContext, extract_article_region, plain_text_excerpt};
