//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// postfeed: aggregate community blog posts from Dev.to, Hashnode, Medium and Ghost
#[derive(Parser, Debug)]
#[command(name = "postfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Never touch the network; every platform answers with nothing
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate the latest posts from every enabled platform
    Fetch(FetchArgs),

    /// Aggregate posts for one topic from topic-aware platforms
    Topic(TopicArgs),

    /// Look up a single external post by id
    Show(ShowArgs),

    /// Merged listing of local and external posts, paged
    Listing(ListingArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Maximum number of posts (defaults to aggregation.default_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TopicArgs {
    /// Topic or tag, e.g. "rust"
    pub topic: String,

    /// Maximum number of posts (defaults to aggregation.default_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Post id as printed by `fetch` or `topic`
    pub id: String,

    /// Also print the article body
    #[arg(long)]
    pub content: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ListingArgs {
    /// Number of pages to reveal
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Override local posts directory
    #[arg(long)]
    pub local_posts_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
