//! Game-record queries: the shared slot state every workflow reads and
//! the single place records are written.

use anyhow::{anyhow, Context, Result};
use sqlx::SqlitePool;

use crate::clock::format_timestamp;
use crate::db::models::{
    Controller, CountryId, GameId, PlayerId, RecordId, SignedSlot, SlotOption,
};
use chrono::NaiveDateTime;

/// Does the player already hold an active record for this option in this
/// game?
pub async fn has_option(
    db: &SqlitePool,
    game: GameId,
    player: PlayerId,
    option: SlotOption,
) -> Result<bool> {
    let found: i64 = sqlx::query_scalar(
        "SELECT EXISTS(
             SELECT 1 FROM game_records
              WHERE player_id = ? AND option = ? AND game_id = ? AND is_active = 1
              LIMIT 1)",
    )
    .bind(player)
    .bind(option.as_i64())
    .bind(game)
    .fetch_one(db)
    .await
    .context("checking player option")?;
    Ok(found != 0)
}

/// Does the country already have an active controller of this role?
pub async fn has_controller(
    db: &SqlitePool,
    game: GameId,
    country: CountryId,
    controller: Controller,
) -> Result<bool> {
    let found: i64 = sqlx::query_scalar(
        "SELECT EXISTS(
             SELECT 1 FROM game_records
              WHERE game_id = ? AND country_id = ? AND controller = ? AND is_active = 1
              LIMIT 1)",
    )
    .bind(game)
    .bind(country)
    .bind(controller.as_i64())
    .fetch_one(db)
    .await
    .context("checking country controller")?;
    Ok(found != 0)
}

/// Player holding the active primary role on a country. Callers only reach
/// this after [`has_controller`] said one exists; an empty result here is a
/// data inconsistency and fails the workflow.
pub async fn primary_controller(
    db: &SqlitePool,
    game: GameId,
    country: CountryId,
) -> Result<PlayerId> {
    sqlx::query_scalar(
        "SELECT player_id FROM game_records
          WHERE game_id = ? AND country_id = ? AND controller = 1 AND is_active = 1",
    )
    .bind(game)
    .bind(country)
    .fetch_one(db)
    .await
    .context("fetching primary controller")
}

pub async fn player_has_any(db: &SqlitePool, game: GameId, player: PlayerId) -> Result<bool> {
    let found: i64 = sqlx::query_scalar(
        "SELECT EXISTS(
             SELECT 1 FROM game_records
              WHERE game_id = ? AND player_id = ? AND is_active = 1
              LIMIT 1)",
    )
    .bind(game)
    .bind(player)
    .fetch_one(db)
    .await
    .context("checking player records")?;
    Ok(found != 0)
}

/// Active slots a player holds in a game, joined with country names for
/// the unsign menu.
pub async fn player_slots(
    db: &SqlitePool,
    game: GameId,
    player: PlayerId,
) -> Result<Vec<SignedSlot>> {
    let rows: Vec<(i64, String, i64, i64)> = sqlx::query_as(
        "SELECT r.record_id, c.name, r.controller, r.option
           FROM game_records r JOIN countries c USING (country_id)
          WHERE r.game_id = ? AND r.player_id = ? AND r.is_active = 1
          ORDER BY r.record_id",
    )
    .bind(game)
    .bind(player)
    .fetch_all(db)
    .await
    .context("listing player slots")?;

    rows.into_iter()
        .map(|(record_id, country_name, controller, option)| {
            Ok(SignedSlot {
                record_id,
                country_name,
                controller: Controller::from_i64(controller)
                    .ok_or_else(|| anyhow!("record {record_id} has controller {controller}"))?,
                option: SlotOption::from_i64(option)
                    .ok_or_else(|| anyhow!("record {record_id} has option {option}"))?,
            })
        })
        .collect()
}

/// Terminal step of the signup negotiation: commit the resolved
/// (country, controller, option) choice.
pub async fn insert(
    db: &SqlitePool,
    game: GameId,
    player: PlayerId,
    country: CountryId,
    faction: i64,
    controller: Controller,
    option: SlotOption,
    now: NaiveDateTime,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO game_records
             (game_id, player_id, country_id, faction_id, controller, option, signup_time)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(game)
    .bind(player)
    .bind(country)
    .bind(faction)
    .bind(controller.as_i64())
    .bind(option.as_i64())
    .bind(format_timestamp(now))
    .execute(db)
    .await
    .context("inserting game record")?;
    Ok(())
}

/// Revoke one slot. The row is kept as history, only the flag drops.
pub async fn deactivate(db: &SqlitePool, record: RecordId) -> Result<()> {
    let rows = sqlx::query("UPDATE game_records SET is_active = 0 WHERE record_id = ?")
        .bind(record)
        .execute(db)
        .await
        .context("deactivating game record")?
        .rows_affected();

    if rows == 0 {
        Err(anyhow!("record {record} does not exist"))
    } else {
        Ok(())
    }
}
