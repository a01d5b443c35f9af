//! Show command - look up one external post

use anyhow::Result;
use serde::Serialize;

use super::{build_service, format_date};
use crate::args::ShowArgs;
use crate::config::AppConfig;
use postfeed_domain::ExternalPost;

#[derive(Serialize)]
struct ShowOutput<'a> {
    post: &'a ExternalPost,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

pub async fn execute(args: ShowArgs, config: &AppConfig, offline: bool) -> Result<()> {
    let service = build_service(config, offline)?;

    let Some(post) = service.get_post_by_id(args.id.trim()).await else {
        anyhow::bail!("Post not found: {}", args.id);
    };

    let body = if args.content {
        Some(service.fetch_post_content(&post).await)
    } else {
        None
    };

    if args.json {
        let output = ShowOutput {
            post: &post,
            body: body.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", post.title);
    println!("{}", "=".repeat(post.title.chars().count().min(80)));
    println!("Source:    {}", post.source);
    println!("Author:    {}", post.author.as_deref().unwrap_or("unknown"));
    println!("Published: {}", format_date(post.published_at));
    println!("Read time: {}", post.read_time);
    if !post.tags.is_empty() {
        println!("Tags:      {}", post.tags.join(", "));
    }
    println!("Link:      {}", post.url);
    println!();
    println!("{}", post.excerpt);

    if let Some(body) = body {
        println!();
        if body.trim().is_empty() {
            println!("Full content is not available here. Read it at {}", post.url);
        } else {
            println!("{}", body);
        }
    }

    Ok(())
}
