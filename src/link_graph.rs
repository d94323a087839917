use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use url::Url;

/// Crawl output: each visited page mapped to the in-scope links found on it.
///
/// Kept in sorted maps so the JSON form (`{"page": ["link", ...]}`) is stable
/// no matter in which order pages finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkGraph {
    links: BTreeMap<String, BTreeSet<String>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_relationships(relationships: &HashMap<Url, HashSet<Url>>) -> Self {
        let mut graph = Self::new();
        for (page, children) in relationships {
            graph.add_page(page, children);
        }
        graph
    }

    /// Record `page` as visited with `children` as its outbound links.
    /// Links of a page already present are merged.
    pub fn add_page<'a>(&mut self, page: &Url, children: impl IntoIterator<Item = &'a Url>) {
        self.links
            .entry(page.to_string())
            .or_default()
            .extend(children.into_iter().map(|url| url.to_string()));
    }

    pub fn get(&self, page: &str) -> Option<&BTreeSet<String>> {
        self.links.get(page)
    }

    pub fn contains_page(&self, page: &str) -> bool {
        self.links.contains_key(page)
    }

    /// Visited pages, sorted
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    /// Flattened view: every visited page plus every link discovered on any of them
    pub fn all_urls(&self) -> BTreeSet<String> {
        let mut urls: BTreeSet<String> = self.links.keys().cloned().collect();
        for children in self.links.values() {
            urls.extend(children.iter().cloned());
        }
        urls
    }

    /// Number of visited pages
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
