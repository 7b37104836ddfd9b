//! Fetch collaborator types
//!
//! The scrape workflow only sees [`ArticleSource`]; the HTTP implementation
//! lives in `services::http_source`, tests plug in canned pages.

use std::collections::BTreeSet;
use thiserror::Error;

/// One article as fetched: title plus the text blocks of its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Paragraph and list-item text, one line per text node
    pub blocks: Vec<String>,
}

/// Fetch errors, scoped to a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("No article content found at {0}")]
    MissingContent(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Source of recipe articles and index pages
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch one article's title and body blocks
    async fn fetch_article(&self, url: &str) -> Result<Article, FetchError>;

    /// Recipe article links listed on a sensor index page
    async fn fetch_index_links(&self, index_url: &str) -> Result<BTreeSet<String>, FetchError>;
}
