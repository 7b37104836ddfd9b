//! HTTP article source
//!
//! Fetches article and index pages with a browser-like User-Agent and keeps a
//! fixed minimum interval between requests. No retries: a failed page is
//! reported to the caller, which skips it.

use crate::services::page_parser::{parse_article, parse_index_links};
use crate::types::{Article, ArticleSource, FetchError};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Settings for [`HttpArticleSource`]
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub min_interval_ms: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            user_agent: fxr_common::config::DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            min_interval_ms: 1000,
        }
    }
}

/// Article source backed by reqwest
pub struct HttpArticleSource {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
}

impl HttpArticleSource {
    pub fn new(config: &HttpSourceConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(config.min_interval_ms)),
        })
    }

    /// GET a page body as text
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        self.rate_limiter.wait().await;

        tracing::debug!(url = %url, "Fetching page");

        let network_error = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(network_error)
    }
}

#[async_trait::async_trait]
impl ArticleSource for HttpArticleSource {
    async fn fetch_article(&self, url: &str) -> Result<Article, FetchError> {
        let html = self.fetch_html(url).await?;
        parse_article(&html).ok_or_else(|| FetchError::MissingContent(url.to_string()))
    }

    async fn fetch_index_links(&self, index_url: &str) -> Result<BTreeSet<String>, FetchError> {
        let html = self.fetch_html(index_url).await?;
        let links = parse_index_links(&html, index_url);
        tracing::info!(index = %index_url, count = links.len(), "Found potential recipes");
        Ok(links)
    }
}
