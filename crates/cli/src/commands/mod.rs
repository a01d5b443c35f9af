//! Subcommand implementations and the wiring they share

pub mod config;
pub mod doctor;
pub mod fetch;
pub mod listing;
pub mod show;
pub mod topic;

use anyhow::{Context, Result};
use postfeed_adapters::AdapterContext;
use postfeed_adapters::cache::InMemoryPostCache;
use postfeed_adapters::net::{ReqwestHttpClient, StubHttpClient};
use postfeed_adapters::platforms::{
    DevtoAdapter, DevtoSettings, GhostAdapter, GhostSettings, HashnodeAdapter, HashnodeSettings,
    MediumAdapter, MediumSettings,
};
use postfeed_adapters::rss2json::Rss2JsonClient;
use postfeed_domain::usecases::{AggregationConfig, AggregationService, CachedAdapter, ProxyFetcher};
use postfeed_domain::{ExternalPost, HttpClient, PostAdapter, PostCache};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;

use crate::config::AppConfig;

/// Build the aggregation service with every configured adapter
pub fn build_service(config: &AppConfig, offline: bool) -> Result<AggregationService> {
    let client: Arc<dyn HttpClient> = if offline {
        tracing::info!("Offline mode: platform requests will fail fast");
        Arc::new(StubHttpClient::offline())
    } else {
        Arc::new(
            ReqwestHttpClient::new(Duration::from_secs(config.general.request_timeout_secs))
                .context("Failed to create HTTP client")?,
        )
    };

    let fetcher = if config.proxy.enabled {
        Arc::new(ProxyFetcher::new(client, config.proxy.patterns.clone()))
    } else {
        Arc::new(ProxyFetcher::direct(client))
    };

    let ctx = AdapterContext::with_strategy(fetcher.clone(), config.general.id_strategy);
    let rss = Arc::new(Rss2JsonClient::new(
        fetcher.clone(),
        config.rss2json.endpoint.clone(),
    ));

    let adapters: Vec<Arc<dyn PostAdapter>> = vec![
        Arc::new(DevtoAdapter::new(ctx.clone(), devto_settings(config))),
        Arc::new(HashnodeAdapter::new(
            ctx.clone(),
            rss.clone(),
            hashnode_settings(config),
        )),
        Arc::new(MediumAdapter::new(ctx.clone(), rss, medium_settings(config))),
        Arc::new(GhostAdapter::new(ctx, ghost_settings(config))),
    ];

    let adapters = if config.cache.enabled {
        let cache: Arc<dyn PostCache> = Arc::new(InMemoryPostCache::new(
            Duration::from_secs(config.cache.duration_secs),
            config.cache.max_entries,
        ));
        adapters
            .into_iter()
            .map(|inner| Arc::new(CachedAdapter::new(inner, cache.clone())) as Arc<dyn PostAdapter>)
            .collect()
    } else {
        adapters
    };

    let adapter_timeout = match config.general.adapter_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    Ok(AggregationService::new(
        adapters,
        fetcher,
        AggregationConfig {
            lookup_limit: config.aggregation.lookup_limit,
            adapter_timeout,
        },
    ))
}

fn devto_settings(config: &AppConfig) -> DevtoSettings {
    DevtoSettings {
        enabled: config.devto.enabled,
        max_posts: config.devto.max_posts,
        base_url: config.devto.base_url.clone(),
        username: config.devto.username.clone(),
        tag: config.devto.tag.clone(),
        shuffle_seed: config.devto.shuffle_seed,
    }
}

fn hashnode_settings(config: &AppConfig) -> HashnodeSettings {
    HashnodeSettings {
        enabled: config.hashnode.enabled,
        max_posts: config.hashnode.max_posts,
        feeds: config.hashnode.feeds.clone(),
        rotation_seed: config.hashnode.rotation_seed,
    }
}

fn medium_settings(config: &AppConfig) -> MediumSettings {
    MediumSettings {
        enabled: config.medium.enabled,
        max_posts: config.medium.max_posts,
        feed_url: config.medium.feed_url.clone(),
        topics: config.medium.topics.clone(),
        rotation_seed: config.medium.rotation_seed,
    }
}

fn ghost_settings(config: &AppConfig) -> GhostSettings {
    GhostSettings {
        enabled: config.ghost.enabled,
        max_posts: config.ghost.max_posts,
        url: config.ghost.url.clone(),
        content_key: ghost_key(config).map(SecretString::from),
        tag: config.ghost.tag.clone(),
    }
}

/// Ghost Content API key from the configured environment variable
pub fn ghost_key(config: &AppConfig) -> Option<String> {
    std::env::var(&config.ghost.content_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Requested limit, or the configured default
pub fn effective_limit(requested: Option<usize>, config: &AppConfig) -> usize {
    requested.unwrap_or(config.aggregation.default_limit)
}

/// One-line human summary of a post
pub fn post_line(post: &ExternalPost) -> String {
    format!(
        "[{}] {} ({}) {}\n    id: {}  by {}  {}",
        post.source,
        post.title,
        post.published_at.date(),
        post.url,
        post.id,
        post.author.as_deref().unwrap_or("unknown"),
        post.read_time
    )
}

/// Print posts as a JSON array or as human-readable lines
pub fn print_posts(posts: &[ExternalPost], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        println!("No posts available.");
        return Ok(());
    }

    for post in posts {
        println!("{}", post_line(post));
    }
    println!();
    println!("{} posts", posts.len());

    Ok(())
}

/// RFC 3339 rendering used in human output
pub fn format_date(date: time::OffsetDateTime) -> String {
    date.format(&Rfc3339).unwrap_or_else(|_| date.to_string())
}
