//! fxr-scrape library interface
//!
//! Harvests recipe articles: fetch collaborator, record extractor and the
//! batch workflow that upserts records into the shared database.

pub mod extractor;
pub mod services;
pub mod types;
pub mod workflow;

pub use crate::extractor::extract;
pub use crate::types::{Article, ArticleSource, FetchError};
pub use crate::workflow::{scrape_all, scrape_article, ScrapeOptions, ScrapeSummary};
