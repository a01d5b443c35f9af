//! Doctor command - validate configuration and show status

use anyhow::Result;
use postfeed_adapters::local::FsLocalPostsRepo;
use postfeed_domain::LocalPostsRepo;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::ghost_key;
use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    local_posts: CheckResult,
    platforms: CheckResult,
    proxy: CheckResult,
    cache: CheckResult,
    ghost: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        local_posts: CheckResult::error("Not checked"),
        platforms: CheckResult::error("Not checked"),
        proxy: CheckResult::error("Not checked"),
        cache: CheckResult::error("Not checked"),
        ghost: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.local_posts =
            check_local_posts(&config.general.local_posts_dir, &config.general.site_author).await;
        report.platforms = check_platforms(config);
        report.proxy = check_proxy(config);
        report.cache = check_cache(config);
        report.ghost = check_ghost(config);
    }

    let checks = [
        &report.config,
        &report.local_posts,
        &report.platforms,
        &report.proxy,
        &report.cache,
        &report.ghost,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_local_posts(dir: &Path, author: &str) -> CheckResult {
    if !dir.exists() {
        return CheckResult::warn(format!(
            "Local posts directory does not exist: {}",
            dir.display()
        ));
    }

    let repo = match FsLocalPostsRepo::new(dir) {
        Ok(r) => r.with_default_author(author),
        Err(e) => return CheckResult::error(format!("Failed to open local posts: {}", e)),
    };

    match repo.load().await {
        Ok(posts) => CheckResult::ok(format!("{} local posts loaded", posts.len())).with_details(
            serde_json::json!({
                "count": posts.len(),
                "ids": posts.iter().map(|p| p.id).collect::<Vec<_>>()
            }),
        ),
        Err(e) => CheckResult::error(format!("Failed to load local posts: {}", e)),
    }
}

fn check_platforms(config: &AppConfig) -> CheckResult {
    let enabled = config.enabled_platforms();
    if enabled.is_empty() {
        return CheckResult::warn("No platforms enabled; only local posts will be listed");
    }

    if config.hashnode.enabled && config.hashnode.feeds.is_empty() {
        return CheckResult::error("Hashnode is enabled but has no feeds");
    }

    if config.medium.enabled && config.medium.feed_url.is_none() && config.medium.topics.is_empty()
    {
        return CheckResult::error("Medium is enabled but has neither feed_url nor topics");
    }

    CheckResult::ok(format!("Enabled: {}", enabled.join(", ")))
        .with_details(serde_json::json!({ "enabled": enabled }))
}

fn check_proxy(config: &AppConfig) -> CheckResult {
    if !config.proxy.enabled {
        return CheckResult::ok("Proxy disabled; requests go direct");
    }

    if config.proxy.patterns.is_empty() {
        return CheckResult::warn("Proxy enabled but no patterns configured");
    }

    let invalid: Vec<&String> = config
        .proxy
        .patterns
        .iter()
        .filter(|p| !p.starts_with("http://") && !p.starts_with("https://"))
        .collect();
    if !invalid.is_empty() {
        return CheckResult::error(format!("Invalid proxy patterns: {:?}", invalid));
    }

    CheckResult::ok(format!("{} proxy patterns", config.proxy.patterns.len()))
}

fn check_cache(config: &AppConfig) -> CheckResult {
    if !config.cache.enabled {
        return CheckResult::ok("Cache disabled");
    }

    if config.cache.duration_secs == 0 || config.cache.max_entries == 0 {
        return CheckResult::warn("Cache enabled but duration or capacity is zero");
    }

    CheckResult::ok(format!(
        "TTL {}s, up to {} entries",
        config.cache.duration_secs, config.cache.max_entries
    ))
}

fn check_ghost(config: &AppConfig) -> CheckResult {
    if !config.ghost.enabled {
        return CheckResult::ok("Ghost disabled");
    }

    let Some(url) = config.ghost.url.as_deref().filter(|u| !u.trim().is_empty()) else {
        return CheckResult::error("Ghost enabled but no site url configured");
    };

    let env_var = &config.ghost.content_key_env;
    match ghost_key(config) {
        Some(_) => CheckResult::ok(format!("Site: {}, Content key: {} (set)", url, env_var)),
        None => CheckResult::warn(format!(
            "Site: {}, Content key: {} (not set)",
            url, env_var
        )),
    }
}

fn print_report(report: &DoctorReport) {
    println!("postfeed Doctor Report");
    println!("======================");
    println!();

    print_check("Config", &report.config);
    print_check("Local posts", &report.local_posts);
    print_check("Platforms", &report.platforms);
    print_check("Proxy", &report.proxy);
    print_check("Cache", &report.cache);
    print_check("Ghost", &report.ghost);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready! Try: postfeed fetch --limit 5");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
