//! fxr-analyze - Recipe trend and consensus reports
//!
//! Reads `film_recipes.db` (read-only) and prints markdown reports: film
//! simulation trends, step setting distributions, the consensus recipe and
//! the stored recipes closest to it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fxr_analyze::consensus::{score, ScoredField};
use fxr_analyze::db::{connect_readonly, queries};
use fxr_analyze::{report, stats};
use fxr_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use fxr_common::db::load_all_recipes;
use fxr_common::RecipeRecord;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fxr-analyze
#[derive(Parser, Debug)]
#[command(name = "fxr-analyze")]
#[command(about = "Trend and consensus reports over harvested film recipes")]
#[command(version)]
struct Args {
    /// Root folder holding film_recipes.db
    #[arg(short, long, env = "FXR_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file (default: <config dir>/fxr/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Consensus profile and closest recipes (default)
    Consensus {
        /// Number of ranked recipes to list
        #[arg(short, long, default_value_t = 5)]
        top: usize,

        /// Only recipes for this sensor
        #[arg(short, long)]
        sensor: Option<String>,

        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// The synthesized consensus recipe card
    Card {
        #[arg(short, long)]
        sensor: Option<String>,
    },
    /// Film simulation and white balance trends
    Trends {
        /// Rows per frequency table
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Distributions of the step settings
    Steps,
    /// Spot-check queries against the stored data
    Verify {
        /// LIKE pattern for the film simulation lookup
        #[arg(long, default_value = "%Reala Ace%")]
        film_simulation: String,

        /// Exact noise reduction text to look for
        #[arg(long, default_value = "-4", allow_hyphen_values = true)]
        noise_reduction: String,

        /// Red shift threshold
        #[arg(long, default_value_t = 2, allow_hyphen_values = true)]
        red_above: i64,

        #[arg(short, long, default_value_t = 5)]
        limit: i64,
    },
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
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting fxr-analyze v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("fxr-analyze")
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder)
        .with_database_file(config.database_file.clone());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match connect_readonly(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let command = args.command.unwrap_or(Command::Consensus {
        top: 5,
        sensor: None,
        json: false,
    });

    match command {
        Command::Consensus { top, sensor, json } => {
            let records = load_records(&pool, sensor.as_deref()).await?;
            let result = score(&records, &ScoredField::ALL);
            if json {
                println!("{}", report::consensus_json(&result, top)?);
            } else {
                println!("{}", report::render_consensus(&result, top));
                println!("{}", report::render_recipe_card(&result.profile));
            }
        }
        Command::Card { sensor } => {
            let records = load_records(&pool, sensor.as_deref()).await?;
            let result = score(&records, &ScoredField::ALL);
            println!("{}", report::render_recipe_card(&result.profile));
        }
        Command::Trends { limit } => {
            let records = load_records(&pool, None).await?;
            let total = queries::total_count(&pool).await?;
            let per_sensor = queries::count_per_sensor(&pool).await?;
            let sensors: Vec<String> = per_sensor.iter().map(|r| r.label.clone()).collect();

            let top_sims =
                stats::label_frequencies(&records, |r| r.film_simulation.as_deref(), Some(limit));
            let by_sensor = stats::top_by_sensor(&records, &sensors, Some(limit));
            let wb = stats::white_balance_trend(&records);

            println!(
                "{}",
                report::render_trends(total, &per_sensor, &top_sims, &by_sensor, wb.as_ref())
            );
        }
        Command::Steps => {
            let records = load_records(&pool, None).await?;
            let dists = stats::step_distributions(&records);
            println!("{}", report::render_step_distributions(&dists));
        }
        Command::Verify {
            film_simulation,
            noise_reduction,
            red_above,
            limit,
        } => {
            verify(&pool, &film_simulation, &noise_reduction, red_above, limit).await?;
        }
    }

    pool.close().await;
    Ok(())
}

/// All stored recipes, optionally for one sensor only
async fn load_records(pool: &sqlx::SqlitePool, sensor: Option<&str>) -> Result<Vec<RecipeRecord>> {
    let mut records = load_all_recipes(pool)
        .await
        .context("Failed to load recipes")?;
    if let Some(sensor) = sensor {
        records.retain(|r| r.sensor == sensor);
    }
    info!(count = records.len(), "Loaded recipes");
    Ok(records)
}

async fn verify(
    pool: &sqlx::SqlitePool,
    film_simulation: &str,
    noise_reduction: &str,
    red_above: i64,
    limit: i64,
) -> Result<()> {
    let listing = |records: &[RecipeRecord]| {
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.sensor.clone(),
                    r.film_simulation.clone().unwrap_or_default(),
                    r.wb_shift_red.map(|v| v.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        report::markdown_table(&["Name", "Sensor", "Film Simulation", "WB Red"], &rows)
    };

    println!("Total recipes: {}\n", queries::total_count(pool).await?);

    println!("## Random sample\n");
    match queries::random_sample(pool).await? {
        Some(record) => println!("{}\n", serde_json::to_string_pretty(&record)?),
        None => println!("No recipes stored.\n"),
    }

    println!("## Film simulations\n");
    for sim in queries::distinct_film_simulations(pool).await? {
        println!("- {}", sim);
    }

    println!("\n## Film simulation like '{}'\n", film_simulation);
    println!(
        "{}",
        listing(&queries::recipes_by_film_simulation(pool, film_simulation).await?)
    );

    println!("## Noise reduction {}\n", noise_reduction);
    println!(
        "{}",
        listing(&queries::recipes_with_noise_reduction(pool, noise_reduction, limit).await?)
    );

    println!("## Red shift above {}\n", red_above);
    println!(
        "{}",
        listing(&queries::recipes_with_red_shift_above(pool, red_above, limit).await?)
    );

    println!("## Top film simulations (as stored)\n");
    let rows: Vec<Vec<String>> = queries::top_film_simulations(pool, limit)
        .await?
        .into_iter()
        .map(|r| vec![r.label, r.count.to_string()])
        .collect();
    println!("{}", report::markdown_table(&["Film Simulation", "Count"], &rows));

    Ok(())
}
