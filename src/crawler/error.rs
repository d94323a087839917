use thiserror::Error;

/// Fatal errors returned by a crawl before any page is fetched
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed url '{0}': must be an absolute http(s) url")]
    InvalidSeed(String),
    #[error("concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why a single GET did not produce a page body.
/// Never fatal: the page simply contributes zero links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchFailure::Timeout
        } else if error.is_connect() || error.is_request() {
            FetchFailure::Network(error.to_string())
        } else if let Some(status) = error.status() {
            FetchFailure::HttpStatus(status.as_u16())
        } else {
            FetchFailure::Other(error.to_string())
        }
    }
}
