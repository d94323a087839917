use async_trait::async_trait;
use log2::debug;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::error::FetchFailure;

/// Status and body of a completed GET
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The one network capability the engine needs: a GET bounded by a timeout.
/// Both the fetcher and the politeness cache go through it, and the network
/// is the only place a crawl task suspends.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpResponse, FetchFailure>;
}

pub type HttpTransportRef = Arc<dyn HttpTransport>;

/// `reqwest` backed transport, one pooled client per crawler
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpResponse, FetchFailure> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

/// Performs one page GET, no retries
#[derive(Clone)]
pub struct Fetcher {
    transport: HttpTransportRef,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(transport: HttpTransportRef, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Body of `url` on a 2xx answer; anything else is a [`FetchFailure`].
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchFailure> {
        let response = self.transport.get(url, self.timeout).await?;

        if !(200..300).contains(&response.status) {
            debug!("Failed to fetch {}: HTTP {}", url, response.status);
            return Err(FetchFailure::HttpStatus(response.status));
        }

        Ok(response.body)
    }
}
