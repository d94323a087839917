pub mod config;
pub mod crawler;
pub mod link_graph;

pub use crawler::{CrawlError, Crawler, CrawlerConfig, crawl};
pub use link_graph::LinkGraph;
