use std::sync::Arc;
use std::time::Duration;

/// Default timeout for page and robots.txt requests in milliseconds
pub const LINK_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Default number of simultaneously in-flight fetches
pub const DEFAULT_CONCURRENCY: usize = 5;
/// Default depth bound, the seed sits at depth 0
pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_USER_AGENT: &str = concat!("site-crawler/", env!("CARGO_PKG_VERSION"));

/// Configuration for the crawler engine
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Pages at depth >= `max_depth` are never fetched
    pub max_depth: usize,
    /// Maximum number of fetch-and-process tasks in flight at once
    pub concurrency: usize,
    pub request_timeout_ms: u64,
    pub robots_timeout_ms: u64,
    /// Sent as the `User-Agent` header, robots.txt is still matched against `*`
    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_ms: LINK_REQUEST_TIMEOUT_MS,
            robots_timeout_ms: LINK_REQUEST_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_request_timeout(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_robots_timeout(mut self, timeout_ms: u64) -> Self {
        self.robots_timeout_ms = timeout_ms;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub type CrawlerConfigRef = Arc<CrawlerConfig>;
