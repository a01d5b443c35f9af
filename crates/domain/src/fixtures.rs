//! Post builders shared by unit tests

use time::OffsetDateTime;

use crate::model::{ExternalPost, LocalPost, Platform, parse_published_at};

fn date(raw: &str) -> OffsetDateTime {
    parse_published_at(raw).expect("test date")
}

pub(crate) fn external_post(source: Platform, id: &str, published: &str) -> ExternalPost {
    ExternalPost {
        id: id.to_string(),
        title: format!("Post {}", id),
        excerpt: "An excerpt".to_string(),
        content: None,
        author: Some("Author".to_string()),
        author_image: None,
        author_bio: None,
        published_at: date(published),
        read_time: "5 min read".to_string(),
        tags: vec!["rust".to_string()],
        category: "Development".to_string(),
        likes: 0,
        comments: 0,
        views: 0,
        image: None,
        url: format!("https://{}.example.com/{}", source, id),
        source,
    }
}

pub(crate) fn local_post(id: u32, published: &str) -> LocalPost {
    LocalPost {
        id,
        title: format!("Local {}", id),
        excerpt: "Local excerpt".to_string(),
        content: "<p>Local body</p>".to_string(),
        author: "Site Owner".to_string(),
        date: date(published),
        read_time: "4 min read".to_string(),
        tags: vec!["career".to_string()],
        category: "Business".to_string(),
        likes: 10,
        comments: 2,
        views: 100,
        image: None,
    }
}
