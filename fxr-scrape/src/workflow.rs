//! Scrape batch workflow
//!
//! index page → article links → fetch → extract → upsert, one article at a
//! time. Failures are scoped to the article (or the sensor, for a failed
//! index page): they are logged, counted, and the batch moves on. Stopping
//! between articles leaves the store consistent because each record is
//! upserted on its own.

use crate::extractor::extract;
use crate::types::{ArticleSource, FetchError};
use fxr_common::config::SensorIndex;
use fxr_common::db::save_recipe;
use fxr_common::RecipeRecord;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

/// Failure while processing a single article
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to save recipe: {0}")]
    Storage(#[from] fxr_common::Error),
}

/// Batch options
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Stop after this many articles per sensor
    pub per_sensor_limit: Option<usize>,
    /// Extract and log, but do not write to the database
    pub dry_run: bool,
}

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub sensors_indexed: usize,
    pub index_failures: usize,
    pub links_found: usize,
    pub saved: usize,
    /// Articles where nothing but name, sensor and URL was found
    pub bare_records: usize,
    pub fetch_failures: usize,
    pub save_failures: usize,
}

/// Fetch, extract and (unless dry-run) save one article
pub async fn scrape_article<S>(
    source: &S,
    pool: &SqlitePool,
    sensor: &str,
    url: &str,
    dry_run: bool,
) -> Result<RecipeRecord, ScrapeError>
where
    S: ArticleSource + ?Sized,
{
    let article = source.fetch_article(url).await?;
    let record = extract(&article.title, &article.blocks, sensor, url);

    info!(
        url = %url,
        title = %record.name,
        film_simulation = %record.film_simulation.as_deref().unwrap_or("-"),
        "Scraped recipe"
    );

    if !dry_run {
        save_recipe(pool, &record).await?;
    }

    Ok(record)
}

/// Scrape every recipe linked from one sensor's index page
pub async fn scrape_sensor<S>(
    source: &S,
    pool: &SqlitePool,
    sensor: &str,
    index_url: &str,
    options: &ScrapeOptions,
    summary: &mut ScrapeSummary,
) where
    S: ArticleSource + ?Sized,
{
    info!(sensor = %sensor, "Fetching index");

    let links = match source.fetch_index_links(index_url).await {
        Ok(links) => links,
        Err(e) => {
            warn!(sensor = %sensor, "Skipping sensor, index unavailable: {}", e);
            summary.index_failures += 1;
            return;
        }
    };

    summary.sensors_indexed += 1;
    summary.links_found += links.len();

    let limit = options.per_sensor_limit.unwrap_or(usize::MAX);
    for url in links.iter().take(limit) {
        match scrape_article(source, pool, sensor, url, options.dry_run).await {
            Ok(record) => {
                if record.is_bare() {
                    summary.bare_records += 1;
                }
                if !options.dry_run {
                    summary.saved += 1;
                }
            }
            Err(ScrapeError::Fetch(e)) => {
                warn!(url = %url, "Failed to fetch: {}", e);
                summary.fetch_failures += 1;
            }
            Err(ScrapeError::Storage(e)) => {
                warn!(url = %url, "Failed to save: {}", e);
                summary.save_failures += 1;
            }
        }
    }
}

/// Scrape all configured sensors in the given order
///
/// An article linked from several index pages is saved once per page; the
/// last sensor scraped wins.
pub async fn scrape_all<S>(
    source: &S,
    pool: &SqlitePool,
    sensors: &[SensorIndex],
    options: &ScrapeOptions,
) -> ScrapeSummary
where
    S: ArticleSource + ?Sized,
{
    let mut summary = ScrapeSummary::default();

    for sensor in sensors {
        scrape_sensor(
            source,
            pool,
            &sensor.name,
            &sensor.index_url,
            options,
            &mut summary,
        )
        .await;
    }

    info!(
        saved = summary.saved,
        fetch_failures = summary.fetch_failures,
        save_failures = summary.save_failures,
        "Scrape complete"
    );

    summary
}
