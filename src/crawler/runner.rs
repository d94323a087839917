use log2::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::config::{CrawlerConfig, CrawlerConfigRef};
use super::error::CrawlError;
use super::fetch::{Fetcher, HttpTransportRef, ReqwestTransport};
use super::normalize::{host_key, in_scope};
use super::robots::PolitenessCache;
use super::scrape::extract_links;
use super::state::{CrawlTask, CrawlerState, CrawlerStateRef, build_graph_from_state};
use crate::link_graph::LinkGraph;

/// Crawl `seed_url` with default timeouts.
///
/// Every page on the seed's host reachable within `max_depth` hops is fetched
/// (the seed is depth 0, so `max_depth == 0` fetches nothing), at most
/// `concurrency` at a time. Only a bad seed or bad arguments fail; unreachable
/// pages and robots.txt just shrink the returned graph.
pub async fn crawl(seed_url: &str, max_depth: usize, concurrency: usize) -> Result<LinkGraph, CrawlError> {
    let config = CrawlerConfig::new()
        .with_max_depth(max_depth)
        .with_concurrency(concurrency);
    Crawler::new(config)?.crawl(seed_url).await
}

/// Checks the seed is an absolute http(s) url and drops its fragment
pub fn parse_seed(seed_url: &str) -> Result<Url, CrawlError> {
    let invalid = || CrawlError::InvalidSeed(seed_url.to_string());

    let mut url = Url::parse(seed_url.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    url.set_fragment(None);
    Ok(url)
}

/// Crawl engine. Holds only configuration and the transport: every run gets
/// its own frontier, robots cache and graph, so one engine can serve
/// concurrent, independent runs.
#[derive(Clone)]
pub struct Crawler {
    config: CrawlerConfigRef,
    transport: HttpTransportRef,
}

impl Crawler {
    /// Engine backed by a `reqwest` client
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let transport = ReqwestTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: CrawlerConfig, transport: HttpTransportRef) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub async fn crawl(&self, seed_url: &str) -> Result<LinkGraph, CrawlError> {
        self.crawl_with_cancel(seed_url, CancellationToken::new()).await
    }

    /// Like [`Crawler::crawl`], but once `cancel` fires no further fetches are
    /// dispatched. In-flight ones run to completion (or their timeout) and the
    /// graph collected so far is returned.
    pub async fn crawl_with_cancel(&self, seed_url: &str, cancel: CancellationToken) -> Result<LinkGraph, CrawlError> {
        let seed = parse_seed(seed_url)?;
        if self.config.concurrency == 0 {
            return Err(CrawlError::InvalidConcurrency(self.config.concurrency));
        }
        let seed_host = host_key(&seed).ok_or_else(|| CrawlError::InvalidSeed(seed_url.to_string()))?;

        let started = Instant::now();
        info!(
            "Crawling {} up to depth {} with {} concurrent fetches",
            seed, self.config.max_depth, self.config.concurrency
        );

        let run = Arc::new(CrawlRun {
            config: Arc::clone(&self.config),
            seed_host,
            fetcher: Fetcher::new(Arc::clone(&self.transport), self.config.request_timeout()),
            politeness: PolitenessCache::new(Arc::clone(&self.transport), self.config.robots_timeout()),
            state: Arc::new(CrawlerState::new(seed, self.config.max_depth)),
        });

        let mut depth = 0;
        while depth < self.config.max_depth {
            if cancel.is_cancelled() {
                info!("Crawl cancelled before depth {}", depth);
                break;
            }

            let tasks = run.state.frontier.lock().await.drain_level();
            if tasks.is_empty() {
                debug!("Nothing left to crawl at depth {}", depth);
                break;
            }

            info!("Crawling depth {}: {} urls", depth, tasks.len());
            run_level(&run, tasks, &cancel).await;
            depth += 1;
        }

        let graph = build_graph_from_state(&run.state).await;
        let visited = run.state.frontier.lock().await.visited_count();
        info!(
            "Crawl finished in {:?}: {} urls visited, {} pages fetched, {} failed, {} disallowed, {} robots policies, {} pages in graph",
            started.elapsed(),
            visited,
            run.state.pages_crawled_count.load(Ordering::Relaxed),
            run.state.failed_fetch_count.load(Ordering::Relaxed),
            run.state.disallowed_count.load(Ordering::Relaxed),
            run.politeness.hosts_seen().await,
            graph.len(),
        );

        Ok(graph)
    }
}

/// Per-run context shared by the tasks of every level
struct CrawlRun {
    config: CrawlerConfigRef,
    seed_host: String,
    fetcher: Fetcher,
    politeness: PolitenessCache,
    state: CrawlerStateRef,
}

type CrawlRunRef = Arc<CrawlRun>;

/// Runs every task of one level, at most `concurrency` at once, and returns only
/// when all of them are done: the next level never overlaps this one.
async fn run_level(run: &CrawlRunRef, tasks: Vec<CrawlTask>, cancel: &CancellationToken) {
    // tokio panics when asked for more than MAX_PERMITS
    let semaphore = Arc::new(Semaphore::new(run.config.concurrency.min(Semaphore::MAX_PERMITS)));
    let mut in_flight = JoinSet::new();

    for task in tasks {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancellation requested, not dispatching remaining urls");
                break;
            }
            permit = Arc::clone(&semaphore).acquire_owned() => permit,
        };
        let Ok(permit) = permit else {
            break;
        };

        if !run.state.frontier.lock().await.mark_visited(&task.url) {
            debug!("Already visited {}, not fetching again", task.url);
            continue;
        }

        let run = Arc::clone(run);
        in_flight.spawn(async move {
            let _permit = permit;
            run.process(task).await;
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            error!("Crawl task failed: {}", e);
        }
    }
}

impl CrawlRun {
    /// Politeness gate -> fetch -> extract -> scope filter -> record -> enqueue.
    /// Failures end here: the page simply contributes no links.
    async fn process(&self, task: CrawlTask) {
        if !self.politeness.is_allowed(&task.url).await {
            self.state.disallowed_count.fetch_add(1, Ordering::Relaxed);
            debug!("Skipping {}: disallowed by robots.txt", task.url);
            return;
        }

        let body = match self.fetcher.fetch(&task.url).await {
            Ok(body) => body,
            Err(e) => {
                self.state.failed_fetch_count.fetch_add(1, Ordering::Relaxed);
                debug!("Failed to fetch {}: {}", task.url, e);
                return;
            }
        };
        self.state.pages_crawled_count.fetch_add(1, Ordering::Relaxed);

        let mut found_urls = HashSet::new();
        for link in extract_links(&task.url, &body) {
            if !in_scope(&self.seed_host, &link) {
                debug!("Skipped foreign host link: {}", link);
                continue;
            }
            if !self.politeness.is_allowed(&link).await {
                continue;
            }
            found_urls.insert(link);
        }

        debug!("Depth {}: {} in-scope links on {}", task.depth, found_urls.len(), task.url);

        {
            let mut relationships = self.state.url_relationships.write().await;
            relationships.insert(task.url.clone(), found_urls.clone());
        }

        let mut frontier = self.state.frontier.lock().await;
        for link in found_urls {
            let outcome = frontier.enqueue_if_new(link.clone(), task.depth + 1);
            trace!("Enqueue {} at depth {}: {:?}", link, task.depth + 1, outcome);
        }
    }
}
