//! Which countries are still open to a player in a game.

use std::collections::HashSet;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::db::models::{CountryChoice, CountryId, GameId, PlayerId};

/// Countries the player can still pick, sorted ascending by country id
/// (deterministic menu order, not alphabetical).
///
/// Starting from every country in the historical era mapping, removes:
/// fully staffed majors (active primary AND secondary), minors with an
/// active primary (minors admit exactly one controller), and every country
/// the player already holds an active record for in this game. The removal
/// sets overlap; set-difference semantics collapse duplicates.
pub async fn available_countries(
    db: &SqlitePool,
    game: GameId,
    player: PlayerId,
) -> Result<Vec<CountryChoice>> {
    let universe: Vec<(i64, String, String)> = sqlx::query_as(
        "SELECT country_id, name, emoji
           FROM countries JOIN countries_factions_historical USING (country_id)
          ORDER BY country_id",
    )
    .fetch_all(db)
    .await
    .context("listing countries")?;

    // >= 2 rather than = 2: an over-staffed country (possible only through
    // the accepted commit race) stays hidden instead of reappearing.
    let staffed_majors: Vec<CountryId> = sqlx::query_scalar(
        "SELECT r.country_id
           FROM game_records r JOIN countries c USING (country_id)
          WHERE r.game_id = ? AND c.is_major = 1 AND r.is_active = 1
          GROUP BY r.country_id
         HAVING COUNT(*) >= 2",
    )
    .bind(game)
    .fetch_all(db)
    .await
    .context("listing staffed majors")?;

    let taken_minors: Vec<CountryId> = sqlx::query_scalar(
        "SELECT r.country_id
           FROM game_records r JOIN countries c USING (country_id)
          WHERE r.game_id = ? AND c.is_major = 0 AND r.is_active = 1
          GROUP BY r.country_id
         HAVING COUNT(*) >= 1",
    )
    .bind(game)
    .fetch_all(db)
    .await
    .context("listing taken minors")?;

    let held_by_player: Vec<CountryId> = sqlx::query_scalar(
        "SELECT country_id FROM game_records
          WHERE game_id = ? AND player_id = ? AND is_active = 1",
    )
    .bind(game)
    .bind(player)
    .fetch_all(db)
    .await
    .context("listing player countries")?;

    let removed: HashSet<CountryId> = staffed_majors
        .into_iter()
        .chain(taken_minors)
        .chain(held_by_player)
        .collect();

    Ok(universe
        .into_iter()
        .filter(|(id, _, _)| !removed.contains(id))
        .map(|(country_id, name, emoji)| CountryChoice {
            country_id,
            name,
            emoji,
        })
        .collect())
}
