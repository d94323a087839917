pub mod state;
pub mod config;
pub mod error;
pub mod normalize;
pub mod scrape;
pub mod fetch;
pub mod robots;
pub mod runner;


pub use state::{CrawlTask, CrawlerState, CrawlerStateRef, Enqueue, Frontier, build_graph_from_state};
pub use config::{CrawlerConfig, CrawlerConfigRef, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH, LINK_REQUEST_TIMEOUT_MS};
pub use error::{CrawlError, FetchFailure};
pub use normalize::{host_key, in_scope, normalize};
pub use scrape::extract_links;
pub use fetch::{Fetcher, HttpResponse, HttpTransport, HttpTransportRef, ReqwestTransport};
pub use robots::PolitenessCache;
pub use runner::{Crawler, crawl, parse_seed};
