//! Topic command - posts for one topic from topic-aware platforms

use anyhow::Result;

use super::{build_service, effective_limit, print_posts};
use crate::args::TopicArgs;
use crate::config::AppConfig;

pub async fn execute(args: TopicArgs, config: &AppConfig, offline: bool) -> Result<()> {
    let topic = args.topic.trim();
    if topic.is_empty() {
        anyhow::bail!("Topic must not be empty");
    }

    let service = build_service(config, offline)?;
    let limit = effective_limit(args.limit, config);

    tracing::info!(topic = %topic, limit, "Aggregating posts by topic");

    let posts = service.get_posts_by_topic(topic, limit).await;
    print_posts(&posts, args.json)
}
