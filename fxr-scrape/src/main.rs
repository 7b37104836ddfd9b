//! fxr-scrape - Recipe harvester
//!
//! Walks each sensor's recipe index page, extracts the settings of every
//! linked article and upserts them into `film_recipes.db`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fxr_common::config::{RootFolderInitializer, RootFolderResolver, SensorIndex, TomlConfig};
use fxr_scrape::services::{HttpArticleSource, HttpSourceConfig};
use fxr_scrape::types::ArticleSource;
use fxr_scrape::workflow::{scrape_all, scrape_article, ScrapeOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fxr-scrape
#[derive(Parser, Debug)]
#[command(name = "fxr-scrape")]
#[command(about = "Harvest film simulation recipes into a local database")]
#[command(version)]
struct Args {
    /// Root folder holding film_recipes.db
    #[arg(short, long, env = "FXR_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file (default: <config dir>/fxr/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum delay between requests, overrides the config file
    #[arg(long)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape every configured sensor index (default)
    Run {
        /// Only these sensors (repeatable)
        #[arg(short, long)]
        sensor: Vec<String>,

        /// Stop after this many articles per sensor
        #[arg(short, long)]
        limit: Option<usize>,

        /// Extract without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Scrape a single article
    Article {
        url: String,

        /// Sensor generation label for the record
        #[arg(short, long)]
        sensor: String,

        /// Print the record as JSON instead of saving it
        #[arg(long)]
        dry_run: bool,
    },
    /// List the recipe links of each configured index page
    Links {
        #[arg(short, long)]
        sensor: Vec<String>,
    },
    /// Create the database and schema, then exit
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting fxr-scrape v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("fxr-scrape")
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder)
        .with_database_file(config.database_file.clone());
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = fxr_common::db::init_database(&db_path)
        .await
        .context("Failed to open recipe database")?;

    let source = HttpArticleSource::new(&HttpSourceConfig {
        user_agent: config.user_agent().to_string(),
        timeout: Duration::from_secs(config.request_timeout_secs()),
        min_interval_ms: args.delay_ms.unwrap_or_else(|| config.request_delay_ms()),
    })?;

    let command = args.command.unwrap_or(Command::Run {
        sensor: Vec::new(),
        limit: None,
        dry_run: false,
    });

    match command {
        Command::Init => {
            info!("Database initialized");
        }
        Command::Article {
            url,
            sensor,
            dry_run,
        } => {
            let record = scrape_article(&source, &pool, &sensor, &url, dry_run).await?;
            if dry_run {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }
        Command::Links { sensor } => {
            for index in select_sensors(&config, &sensor)? {
                let links = source.fetch_index_links(&index.index_url).await?;
                println!("## {} ({} links)", index.name, links.len());
                for link in links {
                    println!("{}", link);
                }
            }
        }
        Command::Run {
            sensor,
            limit,
            dry_run,
        } => {
            let sensors = select_sensors(&config, &sensor)?;
            let options = ScrapeOptions {
                per_sensor_limit: limit,
                dry_run,
            };
            let summary = scrape_all(&source, &pool, &sensors, &options).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    pool.close().await;
    Ok(())
}

/// Configured sensor indexes, narrowed to the requested names
///
/// Configured order is kept regardless of the order names were given in.
fn select_sensors(config: &TomlConfig, wanted: &[String]) -> Result<Vec<SensorIndex>> {
    let mut sensors = config.sensor_indexes();
    if wanted.is_empty() {
        return Ok(sensors);
    }

    if let Some(unknown) = wanted
        .iter()
        .find(|w| !sensors.iter().any(|s| &s.name == *w))
    {
        bail!(
            "Unknown sensor '{}'. Configured: {}",
            unknown,
            sensors
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    sensors.retain(|s| wanted.contains(&s.name));
    Ok(sensors)
}
