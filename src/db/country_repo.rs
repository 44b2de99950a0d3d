//! Country lookups: major flag, display name, historical faction mapping.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::db::models::CountryId;

pub async fn is_major(db: &SqlitePool, country: CountryId) -> Result<bool> {
    let flag: i64 = sqlx::query_scalar("SELECT is_major FROM countries WHERE country_id = ?")
        .bind(country)
        .fetch_one(db)
        .await
        .context("looking up country major flag")?;
    Ok(flag != 0)
}

pub async fn name(db: &SqlitePool, country: CountryId) -> Result<String> {
    sqlx::query_scalar("SELECT name FROM countries WHERE country_id = ?")
        .bind(country)
        .fetch_one(db)
        .await
        .context("looking up country name")
}

/// Faction of a country in the historical era mapping. Every committed
/// record carries this id.
pub async fn faction_id(db: &SqlitePool, country: CountryId) -> Result<i64> {
    sqlx::query_scalar(
        "SELECT faction_id FROM countries_factions_historical WHERE country_id = ?",
    )
    .bind(country)
    .fetch_one(db)
    .await
    .context("looking up country faction")
}
