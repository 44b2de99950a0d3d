//! Player rows are created lazily, the first time someone interacts.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::db::models::PlayerId;

/// Insert the player if unknown; an existing row is left untouched
/// (tag refresh is not modeled).
pub async fn insert_if_missing(db: &SqlitePool, player: PlayerId, tag: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO players (player_id, discord_tag)
         VALUES (?, ?)
         ON CONFLICT (player_id) DO NOTHING",
    )
    .bind(player)
    .bind(tag)
    .execute(db)
    .await
    .context("inserting player")?;
    Ok(())
}
