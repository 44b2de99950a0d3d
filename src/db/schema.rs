//! Store bootstrap: table creation and the process-wide attempt reset.
//!
//! The host calls [`init`] once at startup (before any workflow can run)
//! and [`reset_attempts`] right after it, so attempts left open by a
//! crashed process never block their players.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS players (
         player_id   INTEGER PRIMARY KEY,
         discord_tag TEXT NOT NULL
     )",
    "CREATE TABLE IF NOT EXISTS games (
         game_id       INTEGER PRIMARY KEY,
         game_type     TEXT NOT NULL,
         starting_time TEXT NOT NULL
     )",
    "CREATE TABLE IF NOT EXISTS countries (
         country_id INTEGER PRIMARY KEY,
         name       TEXT NOT NULL,
         emoji      TEXT NOT NULL,
         is_major   INTEGER NOT NULL DEFAULT 0
     )",
    "CREATE TABLE IF NOT EXISTS countries_factions_historical (
         country_id INTEGER NOT NULL,
         faction_id INTEGER NOT NULL,
         PRIMARY KEY (country_id, faction_id)
     )",
    "CREATE TABLE IF NOT EXISTS game_records (
         record_id   INTEGER PRIMARY KEY AUTOINCREMENT,
         game_id     INTEGER NOT NULL,
         player_id   INTEGER NOT NULL,
         country_id  INTEGER NOT NULL,
         faction_id  INTEGER NOT NULL,
         controller  INTEGER NOT NULL,
         option      INTEGER NOT NULL,
         is_active   INTEGER NOT NULL DEFAULT 1,
         signup_time TEXT NOT NULL
     )",
    "CREATE TABLE IF NOT EXISTS signup_attempts (
         attempt_id INTEGER PRIMARY KEY AUTOINCREMENT,
         player_id  INTEGER NOT NULL,
         datetime   TEXT NOT NULL,
         is_active  INTEGER NOT NULL DEFAULT 1
     )",
    "CREATE TABLE IF NOT EXISTS unsign_attempts (
         attempt_id INTEGER PRIMARY KEY AUTOINCREMENT,
         player_id  INTEGER NOT NULL,
         datetime   TEXT NOT NULL,
         is_active  INTEGER NOT NULL DEFAULT 1
     )",
];

/// Create every table the coordinator touches. Idempotent.
pub async fn init(db: &SqlitePool) -> Result<()> {
    for ddl in CREATE_TABLES {
        sqlx::query(ddl)
            .execute(db)
            .await
            .context("creating coordinator tables")?;
    }
    Ok(())
}

/// Mark every attempt of both kinds inactive. Attempt rows are kept for
/// the limiter's historical lookback, only the active flag is cleared.
pub async fn reset_attempts(db: &SqlitePool) -> Result<()> {
    sqlx::query("UPDATE signup_attempts SET is_active = 0")
        .execute(db)
        .await
        .context("resetting signup attempts")?;
    sqlx::query("UPDATE unsign_attempts SET is_active = 0")
        .execute(db)
        .await
        .context("resetting unsign attempts")?;
    Ok(())
}
