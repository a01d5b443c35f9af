//! Fetch command - latest posts from every enabled platform

use anyhow::Result;
use postfeed_domain::usecases::{ExternalPostsFeed, FeedStatus};
use std::sync::Arc;

use super::{build_service, effective_limit, print_posts};
use crate::args::FetchArgs;
use crate::config::AppConfig;

pub async fn execute(args: FetchArgs, config: &AppConfig, offline: bool) -> Result<()> {
    let service = Arc::new(build_service(config, offline)?);
    let limit = effective_limit(args.limit, config);

    tracing::info!(
        limit,
        platforms = ?service.enabled_platforms(),
        "Aggregating external posts"
    );

    let feed = ExternalPostsFeed::new(service, limit);
    feed.mount().await;
    let snapshot = feed.snapshot();
    feed.unmount();

    if snapshot.status == FeedStatus::Error {
        anyhow::bail!(
            "Failed to load posts: {}",
            snapshot.error.unwrap_or_default()
        );
    }

    print_posts(&snapshot.posts, args.json)
}
