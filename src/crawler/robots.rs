use log2::{debug, warn};
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use url::Url;

use super::fetch::HttpTransportRef;
use super::normalize::host_key;

/// Robots group every lookup is matched against
const ROBOTS_USER_AGENT: &str = "*";

/// Field names that make a line a robots.txt record
const ROBOTS_FIELDS: [&str; 5] = ["user-agent", "allow", "disallow", "sitemap", "crawl-delay"];

/// What we learned from a host's robots.txt, resolved once per run
#[derive(Debug, Clone)]
enum HostPolicy {
    /// robots.txt body as served
    Rules(String),
    /// robots.txt couldn't be fetched: the whole host is off limits
    Unavailable,
}

/// Per-host robots.txt policy, fetched on first use and memoized for the run.
///
/// Each host owns a `OnceCell`, so concurrent first lookups for one host share
/// a single robots.txt request while other hosts proceed independently.
pub struct PolitenessCache {
    transport: HttpTransportRef,
    timeout: Duration,
    hosts: Mutex<HashMap<String, Arc<OnceCell<HostPolicy>>>>,
}

impl PolitenessCache {
    pub fn new(transport: HttpTransportRef, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `url` may be fetched. Fails closed: if the host's robots.txt
    /// can't be retrieved, every url on that host is disallowed.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let Some(host) = host_key(url) else {
            return false;
        };
        let origin = format!("{}://{}", url.scheme(), host);

        let cell = {
            let mut hosts = self.hosts.lock().await;
            Arc::clone(hosts.entry(origin.clone()).or_default())
        };

        let policy = cell.get_or_init(|| self.fetch_policy(url, &origin)).await;

        match policy {
            HostPolicy::Rules(body) => {
                let mut matcher = DefaultMatcher::default();
                let allowed = matcher.one_agent_allowed_by_robots(body, ROBOTS_USER_AGENT, url.as_str());
                if !allowed {
                    debug!("robots.txt disallows {}", url);
                }
                allowed
            }
            HostPolicy::Unavailable => false,
        }
    }

    /// Number of hosts whose policy has been looked up so far
    pub async fn hosts_seen(&self) -> usize {
        self.hosts.lock().await.len()
    }

    async fn fetch_policy(&self, url: &Url, origin: &str) -> HostPolicy {
        let robots_url = match url.join("/robots.txt") {
            Ok(robots_url) => robots_url,
            Err(e) => {
                warn!("Could not build robots.txt url for {}: {}", origin, e);
                return HostPolicy::Unavailable;
            }
        };

        match self.transport.get(&robots_url, self.timeout).await {
            Ok(response) if response.status == 200 && is_unparsable(&response.body) => {
                warn!("robots.txt at {} is not a robots file, treating host as disallowed", robots_url);
                HostPolicy::Unavailable
            }
            Ok(response) if response.status == 200 => {
                debug!("Loaded robots.txt for {}", origin);
                HostPolicy::Rules(response.body)
            }
            Ok(response) => {
                warn!(
                    "Could not read robots.txt at {}: HTTP {}, treating host as disallowed",
                    robots_url, response.status
                );
                HostPolicy::Unavailable
            }
            Err(e) => {
                warn!("Could not read robots.txt at {}: {}, treating host as disallowed", robots_url, e);
                HostPolicy::Unavailable
            }
        }
    }
}

/// A 200 body that can't be read as robots.txt: binary content (NUL bytes), or
/// text with something other than comments in it but not a single known field,
/// like an HTML page served in place of a missing file. Blank and comment-only
/// bodies are valid and allow everything.
fn is_unparsable(body: &str) -> bool {
    if body.contains('\0') {
        return true;
    }

    let mut has_content = false;
    for line in body.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        has_content = true;
        if let Some((field, _)) = line.split_once(':') {
            if ROBOTS_FIELDS.contains(&field.trim().to_ascii_lowercase().as_str()) {
                return false;
            }
        }
    }
    has_content
}
