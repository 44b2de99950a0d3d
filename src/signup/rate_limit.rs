//! Burst-cadence limiter over the attempt ledger.
//!
//! The gap is measured between the newest and the 3rd-newest attempt, not
//! between consecutive ones, so a player cannot free-run one attempt every
//! `window - ε`.

use anyhow::Result;
use chrono::Duration;
use sqlx::SqlitePool;

use crate::clock::parse_timestamp;
use crate::config::settings;
use crate::db::attempt_repo;
use crate::db::models::{AttemptKind, PlayerId};

/// How long until this player may open a new attempt of this kind.
/// Zero = allowed now. Fewer historical attempts than the lookback always
/// allow.
pub async fn time_until_allowed(
    db: &SqlitePool,
    player: PlayerId,
    kind: AttemptKind,
) -> Result<Duration> {
    let cfg = settings();
    let stamps =
        attempt_repo::recent_timestamps(db, player, kind, cfg.rate_limit_lookback).await?;

    if stamps.len() < cfg.rate_limit_lookback as usize {
        return Ok(Duration::zero());
    }

    // Newest first; the last row is the oldest attempt inside the lookback.
    let (Some(first), Some(last)) = (stamps.first(), stamps.last()) else {
        return Ok(Duration::zero());
    };
    let newest = parse_timestamp(first)?;
    let oldest = parse_timestamp(last)?;

    let window = Duration::seconds(cfg.rate_limit_window_secs);
    let elapsed = newest - oldest;

    if elapsed < window {
        Ok(window - elapsed)
    } else {
        Ok(Duration::zero())
    }
}

/// Split a remaining wait into whole minutes and leftover seconds for the
/// "wait M minutes S seconds" report.
pub fn minutes_seconds(remaining: Duration) -> (i64, i64) {
    let secs = remaining.num_seconds().max(0);
    (secs / 60, secs % 60)
}
