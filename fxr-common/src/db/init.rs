//! Database initialization
//!
//! Opens (or creates) the SQLite file and makes sure the schema exists.
//! Schema creation is idempotent, so every binary runs it on startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open the database file, creating file and tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_recipes_table(&pool).await?;

    Ok(pool)
}

/// Private in-memory database with the full schema
///
/// A single connection that never expires; every new SQLite memory
/// connection would otherwise see its own empty database.
pub async fn open_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_recipes_table(&pool).await?;

    Ok(pool)
}

/// Create the recipes table
///
/// Fixed setting columns are TEXT because articles write them loosely;
/// `extra_settings` holds a JSON object of settings without a column.
pub async fn create_recipes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            sensor TEXT NOT NULL,
            url TEXT NOT NULL UNIQUE,
            film_simulation TEXT,
            dynamic_range TEXT,
            grain_effect TEXT,
            white_balance TEXT,
            highlight TEXT,
            shadow TEXT,
            color TEXT,
            sharpness TEXT,
            noise_reduction TEXT,
            clarity TEXT,
            iso TEXT,
            exposure_compensation TEXT,
            wb_shift_red INTEGER,
            wb_shift_blue INTEGER,
            extra_settings TEXT NOT NULL DEFAULT '{}',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_sensor ON recipes(sensor)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_recipes_film_simulation ON recipes(film_simulation)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let pool = open_in_memory().await.unwrap();
        create_recipes_table(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_recipes_table_has_expected_columns() {
        let pool = open_in_memory().await.unwrap();

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('recipes') ORDER BY cid")
                .fetch_all(&pool)
                .await
                .unwrap();

        for expected in [
            "url",
            "film_simulation",
            "noise_reduction",
            "wb_shift_red",
            "wb_shift_blue",
            "extra_settings",
        ] {
            assert!(
                columns.iter().any(|c| c == expected),
                "missing column {}",
                expected
            );
        }
    }
}
