//! Listing command - local and external posts merged and paged

use anyhow::{Context, Result};
use postfeed_adapters::local::FsLocalPostsRepo;
use postfeed_domain::usecases::{BlogListing, ExternalPostsFeed, ListingPost};
use postfeed_domain::{LocalPost, LocalPostsRepo};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use super::{build_service, format_date};
use crate::args::ListingArgs;
use crate::config::AppConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingOutput<'a> {
    total: usize,
    has_more: bool,
    posts: &'a [ListingPost],
}

pub async fn execute(args: ListingArgs, config: &AppConfig, offline: bool) -> Result<()> {
    let dir = args
        .local_posts_dir
        .unwrap_or_else(|| config.general.local_posts_dir.clone());
    let local = load_local(&dir, &config.general.site_author).await?;

    let service = Arc::new(build_service(config, offline)?);
    let feed = ExternalPostsFeed::new(service, config.aggregation.default_limit);
    feed.mount().await;
    let snapshot = feed.snapshot();
    feed.unmount();

    if let Some(error) = &snapshot.error {
        tracing::warn!(error = %error, "External posts unavailable; listing local posts only");
    }

    let mut listing = BlogListing::merge(local, snapshot.posts, config.listing.page_size);
    for _ in 1..args.pages.max(1) {
        if listing.load_more() == 0 {
            break;
        }
    }

    tracing::info!(
        total = listing.total(),
        visible = listing.visible().len(),
        "Built blog listing"
    );

    if args.json {
        let output = ListingOutput {
            total: listing.total(),
            has_more: listing.has_more(),
            posts: listing.visible(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if listing.total() == 0 {
        println!("No posts available.");
        return Ok(());
    }

    for post in listing.visible() {
        println!(
            "[{}] {} ({})",
            post.source(),
            post.title(),
            format_date(post.published_at())
        );
        if let Some(url) = post.url() {
            println!("    {}", url);
        }
    }

    println!();
    println!(
        "Showing {} of {} posts{}",
        listing.visible().len(),
        listing.total(),
        if listing.has_more() {
            " (use --pages to load more)"
        } else {
            ""
        }
    );

    Ok(())
}

/// Missing directory means no local posts; malformed files are errors
async fn load_local(dir: &Path, author: &str) -> Result<Vec<LocalPost>> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "Local posts directory not found");
        return Ok(vec![]);
    }

    let repo = FsLocalPostsRepo::new(dir)
        .with_context(|| format!("Failed to open local posts: {}", dir.display()))?
        .with_default_author(author);

    let posts = repo
        .load()
        .await
        .with_context(|| format!("Failed to load local posts: {}", dir.display()))?;

    tracing::debug!(count = posts.len(), "Loaded local posts");

    Ok(posts)
}
