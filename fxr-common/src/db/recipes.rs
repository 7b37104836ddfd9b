//! Recipe persistence
//!
//! Upsert keyed by URL: a later scrape of the same article overwrites every
//! stored field, including clearing fields the new scrape did not find.

use crate::models::RecipeRecord;
use crate::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use tracing::warn;

pub const SELECT_COLUMNS: &str = r#"
    SELECT name, sensor, url, film_simulation, dynamic_range, grain_effect,
           white_balance, highlight, shadow, color, sharpness, noise_reduction,
           clarity, iso, exposure_compensation, wb_shift_red, wb_shift_blue,
           extra_settings
    FROM recipes
"#;

/// Insert or replace the recipe stored under `record.url`
pub async fn save_recipe(pool: &SqlitePool, record: &RecipeRecord) -> Result<()> {
    let extra_settings = serde_json::to_string(&record.extra_settings)?;

    sqlx::query(
        r#"
        INSERT INTO recipes (
            name, sensor, url, film_simulation, dynamic_range, grain_effect,
            white_balance, highlight, shadow, color, sharpness, noise_reduction,
            clarity, iso, exposure_compensation, wb_shift_red, wb_shift_blue,
            extra_settings, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                  CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(url) DO UPDATE SET
            name = excluded.name,
            sensor = excluded.sensor,
            film_simulation = excluded.film_simulation,
            dynamic_range = excluded.dynamic_range,
            grain_effect = excluded.grain_effect,
            white_balance = excluded.white_balance,
            highlight = excluded.highlight,
            shadow = excluded.shadow,
            color = excluded.color,
            sharpness = excluded.sharpness,
            noise_reduction = excluded.noise_reduction,
            clarity = excluded.clarity,
            iso = excluded.iso,
            exposure_compensation = excluded.exposure_compensation,
            wb_shift_red = excluded.wb_shift_red,
            wb_shift_blue = excluded.wb_shift_blue,
            extra_settings = excluded.extra_settings,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&record.name)
    .bind(&record.sensor)
    .bind(&record.url)
    .bind(&record.film_simulation)
    .bind(&record.dynamic_range)
    .bind(&record.grain_effect)
    .bind(&record.white_balance)
    .bind(&record.highlight)
    .bind(&record.shadow)
    .bind(&record.color)
    .bind(&record.sharpness)
    .bind(&record.noise_reduction)
    .bind(&record.clarity)
    .bind(&record.iso)
    .bind(&record.exposure_compensation)
    .bind(record.wb_shift_red)
    .bind(record.wb_shift_blue)
    .bind(extra_settings)
    .execute(pool)
    .await?;

    Ok(())
}

/// All stored recipes in first-insertion order
pub async fn load_all_recipes(pool: &SqlitePool) -> Result<Vec<RecipeRecord>> {
    let rows = sqlx::query(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(record_from_row).collect())
}

/// Load one recipe by its article URL
pub async fn load_recipe_by_url(pool: &SqlitePool, url: &str) -> Result<Option<RecipeRecord>> {
    let row = sqlx::query(&format!("{} WHERE url = ?", SELECT_COLUMNS))
        .bind(url)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(record_from_row))
}

pub async fn count_recipes(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Map a row selected with [`SELECT_COLUMNS`] to a record
///
/// An unreadable `extra_settings` value degrades to an empty map.
pub fn record_from_row(row: &SqliteRow) -> RecipeRecord {
    let url: String = row.get("url");
    let extra_json: Option<String> = row.get("extra_settings");

    let extra_settings = match extra_json.as_deref() {
        None | Some("") => BTreeMap::new(),
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            warn!(url = %url, "Unreadable extra_settings, ignoring: {}", e);
            BTreeMap::new()
        }),
    };

    RecipeRecord {
        name: row.get("name"),
        sensor: row.get("sensor"),
        film_simulation: row.get("film_simulation"),
        dynamic_range: row.get("dynamic_range"),
        grain_effect: row.get("grain_effect"),
        white_balance: row.get("white_balance"),
        highlight: row.get("highlight"),
        shadow: row.get("shadow"),
        color: row.get("color"),
        sharpness: row.get("sharpness"),
        noise_reduction: row.get("noise_reduction"),
        clarity: row.get("clarity"),
        iso: row.get("iso"),
        exposure_compensation: row.get("exposure_compensation"),
        wb_shift_red: row.get("wb_shift_red"),
        wb_shift_blue: row.get("wb_shift_blue"),
        extra_settings,
        url,
    }
}
