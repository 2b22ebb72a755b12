//! Page fetching for URL-based article references.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use articlechat_shared::{ArticleChatError, FetchConfig, Result};

/// Raw result of a single GET.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one GET per call. No retries, no caching.
///
/// Any HTTP status is returned as a [`FetchedPage`]; only transport
/// failures (DNS, connect, timeout, body read) are errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchedPage>;
}

/// `reqwest`-backed fetcher presenting a browser-like `User-Agent`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher sending `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ArticleChatError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        Self::new(&config.user_agent)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(%url))]
    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchedPage> {
        let start = Instant::now();
        debug!(timeout_ms = timeout.as_millis(), "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ArticleChatError::Fetch(format!("{url}: {e}")))?;

        let status = response.status().as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| ArticleChatError::Fetch(format!("{url}: body read failed: {e}")))?;

        debug!(
            status,
            bytes = body.len(),
            duration_ms = start.elapsed().as_millis(),
            "page fetched"
        );

        Ok(FetchedPage { status, body })
    }
}
