//! Merged blog listing with client-side "load more" pagination

use serde::Serialize;
use std::collections::HashSet;
use time::OffsetDateTime;

use crate::model::{ExternalPost, LocalPost, Platform};

/// One row of the listing: a site-authored or an external post
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListingPost {
    Local(LocalPost),
    External(ExternalPost),
}

impl ListingPost {
    pub fn source(&self) -> Platform {
        match self {
            ListingPost::Local(_) => Platform::Local,
            ListingPost::External(post) => post.source,
        }
    }

    /// Compound key, unique within a listing: `"{source}-{id}"`
    pub fn key(&self) -> String {
        match self {
            ListingPost::Local(post) => format!("{}-{}", Platform::Local, post.id),
            ListingPost::External(post) => format!("{}-{}", post.source, post.id),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ListingPost::Local(post) => &post.title,
            ListingPost::External(post) => &post.title,
        }
    }

    pub fn published_at(&self) -> OffsetDateTime {
        match self {
            ListingPost::Local(post) => post.date,
            ListingPost::External(post) => post.published_at,
        }
    }

    /// Link to the original article (external posts only)
    pub fn url(&self) -> Option<&str> {
        match self {
            ListingPost::Local(_) => None,
            ListingPost::External(post) => Some(&post.url),
        }
    }
}

/// Date-sorted listing of local and external posts revealed page by page
#[derive(Debug, Clone)]
pub struct BlogListing {
    posts: Vec<ListingPost>,
    page_size: usize,
    visible: usize,
}

impl BlogListing {
    /// Merge both sources, newest first. Ties keep local posts ahead of
    /// external ones; repeated keys keep the first occurrence.
    pub fn merge(local: Vec<LocalPost>, external: Vec<ExternalPost>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let mut seen = HashSet::new();

        let mut posts: Vec<ListingPost> = local
            .into_iter()
            .map(ListingPost::Local)
            .chain(external.into_iter().map(ListingPost::External))
            .filter(|post| seen.insert(post.key()))
            .collect();

        posts.sort_by(|a, b| b.published_at().cmp(&a.published_at()));

        let visible = page_size.min(posts.len());

        Self {
            posts,
            page_size,
            visible,
        }
    }

    /// Posts revealed so far
    pub fn visible(&self) -> &[ListingPost] {
        &self.posts[..self.visible]
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.posts.len()
    }

    /// Reveal the next page; returns how many posts became visible
    pub fn load_more(&mut self) -> usize {
        let before = self.visible;
        self.visible = (self.visible + self.page_size).min(self.posts.len());
        self.visible - before
    }

    pub fn total(&self) -> usize {
        self.posts.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn all(&self) -> &[ListingPost] {
        &self.posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{external_post, local_post};

    fn sample() -> BlogListing {
        let local = vec![local_post(1, "2024-01-10"), local_post(2, "2024-03-01")];
        let external = vec![
            external_post(Platform::Devto, "a", "2024-02-01"),
            external_post(Platform::Medium, "b", "2024-01-10"),
            external_post(Platform::Hashnode, "c", "2023-12-01"),
        ];
        BlogListing::merge(local, external, 2)
    }

    #[test]
    fn test_merge_sorts_by_date_and_prefers_local_on_ties() {
        let listing = sample();

        let keys: Vec<_> = listing.all().iter().map(ListingPost::key).collect();
        assert_eq!(
            keys,
            vec!["local-2", "devto-a", "local-1", "medium-b", "hashnode-c"]
        );
    }

    #[test]
    fn test_keys_are_unique() {
        let listing = sample();
        let keys: HashSet<_> = listing.all().iter().map(ListingPost::key).collect();
        assert_eq!(keys.len(), listing.total());
    }

    #[test]
    fn test_local_and_external_with_same_id_do_not_collide() {
        let local = vec![local_post(7, "2024-01-01")];
        let external = vec![external_post(Platform::Devto, "7", "2024-01-01")];

        let listing = BlogListing::merge(local, external, 10);

        assert_eq!(listing.total(), 2);
        assert_eq!(listing.all()[0].source(), Platform::Local);
    }

    #[test]
    fn test_load_more_reveals_pages_without_refetch() {
        let mut listing = sample();

        assert_eq!(listing.visible().len(), 2);
        assert!(listing.has_more());

        assert_eq!(listing.load_more(), 2);
        assert_eq!(listing.visible().len(), 4);

        assert_eq!(listing.load_more(), 1);
        assert_eq!(listing.visible().len(), 5);
        assert!(!listing.has_more());

        assert_eq!(listing.load_more(), 0);
    }

    #[test]
    fn test_empty_listing() {
        let listing = BlogListing::merge(vec![], vec![], 6);
        assert!(listing.visible().is_empty());
        assert!(!listing.has_more());
    }

    #[test]
    fn test_external_rows_link_to_original() {
        let listing = sample();
        let devto = listing
            .all()
            .iter()
            .find(|p| p.source() == Platform::Devto)
            .unwrap();
        assert_eq!(devto.url(), Some("https://devto.example.com/a"));
        assert_eq!(listing.all()[0].url(), None);
    }
}
