//! Configuration loading and management

use anyhow::{Context, Result};
use postfeed_domain::IdStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub aggregation: AggregationSection,

    #[serde(default)]
    pub listing: ListingConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub rss2json: Rss2JsonConfig,

    #[serde(default)]
    pub devto: DevtoConfig,

    #[serde(default)]
    pub hashnode: HashnodeConfig,

    #[serde(default)]
    pub medium: MediumConfig,

    #[serde(default)]
    pub ghost: GhostConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_local_posts_dir")]
    pub local_posts_dir: PathBuf,

    #[serde(default = "default_site_author")]
    pub site_author: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// 0 waits for every adapter indefinitely
    #[serde(default = "default_adapter_timeout")]
    pub adapter_timeout_secs: u64,

    #[serde(default)]
    pub id_strategy: IdStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSection {
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_lookup_limit")]
    pub lookup_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_proxy_patterns")]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_cache_duration")]
    pub duration_secs: u64,

    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rss2JsonConfig {
    #[serde(default = "default_rss2json_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevtoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_devto_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    #[serde(default = "default_devto_max_posts")]
    pub max_posts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashnodeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_hashnode_feeds")]
    pub feeds: Vec<String>,

    #[serde(default)]
    pub rotation_seed: Option<u64>,

    #[serde(default = "default_feed_max_posts")]
    pub max_posts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediumConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub feed_url: Option<String>,

    #[serde(default = "default_medium_topics")]
    pub topics: Vec<String>,

    #[serde(default)]
    pub rotation_seed: Option<u64>,

    #[serde(default = "default_feed_max_posts")]
    pub max_posts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_ghost_key_env")]
    pub content_key_env: String,

    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default = "default_feed_max_posts")]
    pub max_posts: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_posts_dir() -> PathBuf {
    PathBuf::from("./posts")
}

fn default_site_author() -> String {
    "Site Owner".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_adapter_timeout() -> u64 {
    20
}

fn default_limit() -> usize {
    12
}

fn default_lookup_limit() -> usize {
    100
}

fn default_page_size() -> usize {
    6
}

fn default_true() -> bool {
    true
}

fn default_proxy_patterns() -> Vec<String> {
    vec![
        "https://api.allorigins.win/raw?url={url}".to_string(),
        "https://corsproxy.io/?{url}".to_string(),
        "https://api.codetabs.com/v1/proxy?quest=".to_string(),
    ]
}

fn default_cache_duration() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    64
}

fn default_rss2json_endpoint() -> String {
    postfeed_adapters::rss2json::DEFAULT_ENDPOINT.to_string()
}

fn default_devto_base_url() -> String {
    "https://dev.to".to_string()
}

fn default_devto_max_posts() -> usize {
    30
}

fn default_feed_max_posts() -> usize {
    20
}

fn default_hashnode_feeds() -> Vec<String> {
    postfeed_adapters::platforms::HashnodeSettings::default().feeds
}

fn default_medium_topics() -> Vec<String> {
    postfeed_adapters::platforms::MediumSettings::default().topics
}

fn default_ghost_key_env() -> String {
    "GHOST_CONTENT_API_KEY".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            local_posts_dir: default_local_posts_dir(),
            site_author: default_site_author(),
            request_timeout_secs: default_request_timeout(),
            adapter_timeout_secs: default_adapter_timeout(),
            id_strategy: IdStrategy::default(),
        }
    }
}

impl Default for AggregationSection {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            lookup_limit: default_lookup_limit(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: default_proxy_patterns(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_secs: default_cache_duration(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for Rss2JsonConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rss2json_endpoint(),
        }
    }
}

impl Default for DevtoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_devto_base_url(),
            username: None,
            tag: None,
            shuffle_seed: None,
            max_posts: default_devto_max_posts(),
        }
    }
}

impl Default for HashnodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            feeds: default_hashnode_feeds(),
            rotation_seed: None,
            max_posts: default_feed_max_posts(),
        }
    }
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            feed_url: None,
            topics: default_medium_topics(),
            rotation_seed: None,
            max_posts: default_feed_max_posts(),
        }
    }
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            content_key_env: default_ghost_key_env(),
            tag: None,
            max_posts: default_feed_max_posts(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Environment overrides, e.g. POSTFEED__DEVTO__ENABLED=false
        builder = builder.add_source(
            config::Environment::with_prefix("POSTFEED")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Platforms switched on in this configuration
    pub fn enabled_platforms(&self) -> Vec<&'static str> {
        [
            ("devto", self.devto.enabled),
            ("hashnode", self.hashnode.enabled),
            ("medium", self.medium.enabled),
            ("ghost", self.ghost.enabled),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# postfeed configuration

[general]
log_level = "info"
local_posts_dir = "./posts"
site_author = "Site Owner"
request_timeout_secs = 15
# 0 waits for every platform indefinitely
adapter_timeout_secs = 20
id_strategy = "stable"  # stable, per_fetch

[aggregation]
default_limit = 12
lookup_limit = 100

[listing]
page_size = 6

[proxy]
enabled = true
# "{url}" is replaced by the encoded target; otherwise it is appended
patterns = [
  "https://api.allorigins.win/raw?url={url}",
  "https://corsproxy.io/?{url}",
  "https://api.codetabs.com/v1/proxy?quest=",
]

[cache]
enabled = true
duration_secs = 300
max_entries = 64

[rss2json]
endpoint = "https://api.rss2json.com/v1/api.json"

[devto]
enabled = true
base_url = "https://dev.to"
# username = "your_devto_username"
# tag = "rust"
# shuffle_seed = 42
max_posts = 30

[hashnode]
enabled = true
feeds = [
  "https://hashnode.com/n/programming/rss",
  "https://hashnode.com/n/webdev/rss",
  "https://hashnode.com/n/javascript/rss",
  "https://hashnode.com/n/rust/rss",
]
# rotation_seed = 0
max_posts = 20

[medium]
enabled = true
# feed_url = "https://medium.com/feed/@your_handle"
topics = ["programming", "software-engineering", "web-development"]
# rotation_seed = 0
max_posts = 20

[ghost]
enabled = false
# url = "https://blog.example.com"
content_key_env = "GHOST_CONTENT_API_KEY"
# tag = "engineering"
max_posts = 20
"#
        .to_string()
    }
}
