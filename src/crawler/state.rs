use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::link_graph::LinkGraph;

/// A url waiting to be crawled, the seed sits at depth 0
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize,
}

/// Outcome of [`Frontier::enqueue_if_new`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Added,
    /// Already visited, or already pending in the running or the next level
    AlreadySeen,
    /// `depth >= max_depth`, would never be fetched
    BeyondDepth,
}

/// Level-synchronous BFS queue plus the visited set.
///
/// Tasks go into the next level; [`Frontier::drain_level`] promotes that level
/// to running. A url is only *visited* once a fetch is dispatched for it.
#[derive(Debug)]
pub struct Frontier {
    max_depth: usize,
    visited: HashSet<Url>,
    /// Urls of the level currently being crawled
    running: HashSet<Url>,
    next: Vec<CrawlTask>,
    next_urls: HashSet<Url>,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            visited: HashSet::new(),
            running: HashSet::new(),
            next: Vec::new(),
            next_urls: HashSet::new(),
        }
    }

    pub fn enqueue_if_new(&mut self, url: Url, depth: usize) -> Enqueue {
        if depth >= self.max_depth {
            return Enqueue::BeyondDepth;
        }
        if self.visited.contains(&url) || self.running.contains(&url) || self.next_urls.contains(&url) {
            return Enqueue::AlreadySeen;
        }

        self.next_urls.insert(url.clone());
        self.next.push(CrawlTask { url, depth });
        Enqueue::Added
    }

    /// Hands out every task of the level about to run and starts collecting the one after it.
    /// Only the coordinating task calls this, once per level.
    pub fn drain_level(&mut self) -> Vec<CrawlTask> {
        self.running = std::mem::take(&mut self.next_urls);
        std::mem::take(&mut self.next)
    }

    /// Records that a fetch is being dispatched for `url`.
    /// Returns false when it was already visited, in which case nothing must be fetched.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.clone())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.next.len()
    }
}

/// Everything one crawl run mutates. Created fresh per run, never shared between runs.
pub struct CrawlerState {
    /// Number of pages fetched successfully
    pub pages_crawled_count: AtomicUsize,
    /// Fetches that ended in a `FetchFailure`
    pub failed_fetch_count: AtomicUsize,
    /// Urls skipped because robots.txt said no
    pub disallowed_count: AtomicUsize,
    /// Queue and visited set behind one lock, so "mark visited" and
    /// "enqueue if new" can't interleave
    pub frontier: Mutex<Frontier>,
    /// Page -> in-scope links found on it
    pub url_relationships: RwLock<HashMap<Url, HashSet<Url>>>,
}

impl CrawlerState {
    pub fn new(starting_url: Url, max_depth: usize) -> Self {
        let mut frontier = Frontier::new(max_depth);
        frontier.enqueue_if_new(starting_url, 0);

        Self {
            pages_crawled_count: AtomicUsize::new(0),
            failed_fetch_count: AtomicUsize::new(0),
            disallowed_count: AtomicUsize::new(0),
            frontier: Mutex::new(frontier),
            url_relationships: RwLock::new(HashMap::new()),
        }
    }
}

pub type CrawlerStateRef = Arc<CrawlerState>;

/// Snapshot the relationships collected so far as the crawl's output
pub async fn build_graph_from_state(state: &CrawlerStateRef) -> LinkGraph {
    let relationships = state.url_relationships.read().await;
    LinkGraph::from_relationships(&relationships)
}
