//! Session attempt ledger: open/closed markers for in-progress workflows.
//!
//! Rows are never deleted; the rate limiter reads the historical tail.
//! `begin` inserts unconditionally; the one-active-attempt-per-kind rule
//! is a caller precondition (see `signup::guard`), not enforced here.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::clock::format_timestamp;
use crate::db::models::{AttemptKind, PlayerId};

/// Open a new active attempt marker for this player and kind.
pub async fn begin(
    db: &SqlitePool,
    player: PlayerId,
    kind: AttemptKind,
    now: NaiveDateTime,
) -> Result<()> {
    let sql = format!(
        "INSERT INTO {} (player_id, datetime, is_active) VALUES (?, ?, 1)",
        kind.table()
    );
    sqlx::query(&sql)
        .bind(player)
        .bind(format_timestamp(now))
        .execute(db)
        .await
        .context("opening attempt")?;
    Ok(())
}

pub async fn has_active(db: &SqlitePool, player: PlayerId, kind: AttemptKind) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE player_id = ? AND is_active = 1 LIMIT 1)",
        kind.table()
    );
    let found: i64 = sqlx::query_scalar(&sql)
        .bind(player)
        .fetch_one(db)
        .await
        .context("checking active attempt")?;
    Ok(found != 0)
}

/// Deactivate every attempt of this kind for the player. Idempotent;
/// called at workflow termination and by the process-wide reset.
pub async fn end_all(db: &SqlitePool, player: PlayerId, kind: AttemptKind) -> Result<()> {
    let sql = format!("UPDATE {} SET is_active = 0 WHERE player_id = ?", kind.table());
    sqlx::query(&sql)
        .bind(player)
        .execute(db)
        .await
        .context("closing attempts")?;
    Ok(())
}

/// The `limit` most recent attempt timestamps (any active flag), newest
/// first. Textual ordering is correct because the format is fixed-width.
pub async fn recent_timestamps(
    db: &SqlitePool,
    player: PlayerId,
    kind: AttemptKind,
    limit: u32,
) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT datetime FROM {} WHERE player_id = ? ORDER BY datetime DESC LIMIT ?",
        kind.table()
    );
    sqlx::query_scalar(&sql)
        .bind(player)
        .bind(limit as i64)
        .fetch_all(db)
        .await
        .context("reading attempt history")
}
