use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::crawler::{CrawlerConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH, LINK_REQUEST_TIMEOUT_MS};
use crate::crawler::config::DEFAULT_USER_AGENT;

/// Log levels as defined in log2 crate
#[derive(Debug, Serialize, Deserialize, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// How the link graph is written out
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `{"page": ["link", ...]}`
    Json,
    /// Every visited or discovered url, one per line
    List,
}

/// This struct is supposed to receive all program arguments while CrawlerConfig
/// describes only the crawler engine
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Absolute http(s) url to start from
    #[arg(short, long)]
    pub seed_url: String,
    /// Maximum depth to crawl, the seed is depth 0
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
    /// Maximum number of simultaneous fetches
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
    /// Timeout of a single page request in milliseconds
    #[arg(long, default_value_t = LINK_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,
    /// Timeout of a robots.txt request in milliseconds
    #[arg(long, default_value_t = LINK_REQUEST_TIMEOUT_MS)]
    pub robots_timeout_ms: u64,
    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
    /// Output format of the link graph
    #[arg(short, long, default_value = "json", value_enum)]
    pub format: OutputFormat,
    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", value_enum)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than 0");
        }
        if self.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be greater than 0");
        }
        if self.robots_timeout_ms == 0 {
            anyhow::bail!("robots_timeout_ms must be greater than 0");
        }
        Ok(())
    }

    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig::new()
            .with_max_depth(self.max_depth)
            .with_concurrency(self.concurrency)
            .with_request_timeout(self.request_timeout_ms)
            .with_robots_timeout(self.robots_timeout_ms)
            .with_user_agent(self.user_agent.clone())
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}
