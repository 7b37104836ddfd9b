//! Trend and verification queries over the recipes table

use anyhow::Result;
use fxr_common::db::{record_from_row, SELECT_COLUMNS};
use fxr_common::RecipeRecord;
use serde::Serialize;
use sqlx::SqlitePool;

/// A label with its row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: i64,
}

pub async fn total_count(pool: &SqlitePool) -> Result<i64> {
    Ok(fxr_common::db::count_recipes(pool).await?)
}

/// One stored recipe picked at random, for spot-checking extraction
pub async fn random_sample(pool: &SqlitePool) -> Result<Option<RecipeRecord>> {
    let row = sqlx::query(&format!("{} ORDER BY RANDOM() LIMIT 1", SELECT_COLUMNS))
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(record_from_row))
}

/// Every film simulation spelling present, alphabetically
pub async fn distinct_film_simulations(pool: &SqlitePool) -> Result<Vec<String>> {
    let sims = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT film_simulation
        FROM recipes
        WHERE film_simulation IS NOT NULL AND film_simulation <> ''
        ORDER BY film_simulation ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(sims)
}

/// Recipes whose film simulation matches a SQL LIKE pattern
pub async fn recipes_by_film_simulation(
    pool: &SqlitePool,
    pattern: &str,
) -> Result<Vec<RecipeRecord>> {
    let rows = sqlx::query(&format!(
        "{} WHERE film_simulation LIKE ? ORDER BY id ASC",
        SELECT_COLUMNS
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(record_from_row).collect())
}

pub async fn count_per_sensor(pool: &SqlitePool) -> Result<Vec<CountRow>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT sensor, COUNT(*) AS count
        FROM recipes
        GROUP BY sensor
        ORDER BY count DESC, sensor ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(label, count)| CountRow { label, count })
        .collect())
}

/// Recipes whose noise reduction text is exactly `value`
pub async fn recipes_with_noise_reduction(
    pool: &SqlitePool,
    value: &str,
    limit: i64,
) -> Result<Vec<RecipeRecord>> {
    let rows = sqlx::query(&format!(
        "{} WHERE noise_reduction = ? ORDER BY id ASC LIMIT ?",
        SELECT_COLUMNS
    ))
    .bind(value)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(record_from_row).collect())
}

/// Recipes shifted further toward red than `threshold`
pub async fn recipes_with_red_shift_above(
    pool: &SqlitePool,
    threshold: i64,
    limit: i64,
) -> Result<Vec<RecipeRecord>> {
    let rows = sqlx::query(&format!(
        "{} WHERE wb_shift_red > ? ORDER BY wb_shift_red DESC, id ASC LIMIT ?",
        SELECT_COLUMNS
    ))
    .bind(threshold)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(record_from_row).collect())
}

/// Most used film simulations, as stored (no whitespace cleanup)
pub async fn top_film_simulations(pool: &SqlitePool, limit: i64) -> Result<Vec<CountRow>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT film_simulation, COUNT(*) AS count
        FROM recipes
        WHERE film_simulation IS NOT NULL AND film_simulation <> ''
        GROUP BY film_simulation
        ORDER BY count DESC, film_simulation ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(label, count)| CountRow { label, count })
        .collect())
}
