//! Compound workflow entry check.
//!
//! One operation per workflow kind runs every precondition in its fixed
//! order (DM gate → record state → active attempts → rate limit →
//! availability) and returns either a clearance or a structured rejection.
//! Callers open the attempt marker only after full clearance, so a
//! rejection never leaves partial state behind.

use anyhow::Result;
use chrono::Duration;
use sqlx::SqlitePool;

use crate::db::models::{
    AttemptKind, CountryChoice, GameId, PlayerId, SignedSlot, SlotOption,
};
use crate::db::{attempt_repo, record_repo};
use crate::signup::availability;
use crate::signup::rate_limit::{self, minutes_seconds};
use crate::transport::Transport;

/// Why a workflow was refused at the door. Always recoverable: the player
/// retries after the reported condition clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    DmClosed,
    AlreadySignedBothOptions,
    NothingToUnsign,
    ActiveSignupAttempt,
    ActiveUnsignAttempt,
    RateLimited {
        kind: AttemptKind,
        remaining: Duration,
    },
    NoCountriesLeft,
}

impl Rejection {
    /// Private report sent back to the actor.
    pub fn player_message(&self) -> String {
        match self {
            Rejection::DmClosed => {
                "Unfortunately, you cannot sign up for the game because your direct \
                 messages are closed. Please, open direct messages first."
                    .into()
            }
            Rejection::AlreadySignedBothOptions => {
                "You are already signed up! Please unsign first.".into()
            }
            Rejection::NothingToUnsign => "You are not signed up for any country!".into(),
            Rejection::ActiveSignupAttempt => {
                "You already have a signup attempt! Please, finish this one first.".into()
            }
            Rejection::ActiveUnsignAttempt => {
                "You already have a unsign attempt! Please, finish this one first.".into()
            }
            Rejection::RateLimited { kind, remaining } => {
                let (minutes, seconds) = minutes_seconds(*remaining);
                format!(
                    "You have {minutes} minutes {seconds} seconds until you can {} again.",
                    kind.verb()
                )
            }
            Rejection::NoCountriesLeft => {
                "There are no countries left to sign up for in this game!".into()
            }
        }
    }
}

/// Outcome of a preflight: cleared with workflow inputs, or refused.
#[derive(Debug)]
pub enum Gate<T> {
    Cleared(T),
    Rejected(Rejection),
}

/// Everything the signup workflow needs once admitted.
#[derive(Debug)]
pub struct SignupClearance {
    /// Option forced by an existing record (holds first → second and vice
    /// versa); `None` leaves the option menu open.
    pub preset_option: Option<SlotOption>,
    pub countries: Vec<CountryChoice>,
}

#[derive(Debug)]
pub struct UnsignClearance {
    pub slots: Vec<SignedSlot>,
}

pub async fn preflight_signup(
    db: &SqlitePool,
    transport: &dyn Transport,
    game: GameId,
    player: PlayerId,
) -> Result<Gate<SignupClearance>> {
    if !transport.dm_reachable(player).await {
        return Ok(Gate::Rejected(Rejection::DmClosed));
    }

    let holds_first = record_repo::has_option(db, game, player, SlotOption::First).await?;
    let holds_second = record_repo::has_option(db, game, player, SlotOption::Second).await?;
    if holds_first && holds_second {
        return Ok(Gate::Rejected(Rejection::AlreadySignedBothOptions));
    }

    if let Some(rejection) = attempt_gates(db, player).await? {
        return Ok(Gate::Rejected(rejection));
    }

    let countries = availability::available_countries(db, game, player).await?;
    if countries.is_empty() {
        return Ok(Gate::Rejected(Rejection::NoCountriesLeft));
    }

    let preset_option = if holds_first {
        Some(SlotOption::Second)
    } else if holds_second {
        Some(SlotOption::First)
    } else {
        None
    };

    Ok(Gate::Cleared(SignupClearance {
        preset_option,
        countries,
    }))
}

pub async fn preflight_unsign(
    db: &SqlitePool,
    transport: &dyn Transport,
    game: GameId,
    player: PlayerId,
) -> Result<Gate<UnsignClearance>> {
    if !transport.dm_reachable(player).await {
        return Ok(Gate::Rejected(Rejection::DmClosed));
    }

    let slots = record_repo::player_slots(db, game, player).await?;
    if slots.is_empty() {
        return Ok(Gate::Rejected(Rejection::NothingToUnsign));
    }

    if let Some(rejection) = attempt_gates(db, player).await? {
        return Ok(Gate::Rejected(rejection));
    }

    Ok(Gate::Cleared(UnsignClearance { slots }))
}

/// Shared middle section of both preflights. Order matters: active
/// attempts are checked before the limiter so a player stuck in a live
/// workflow is told that, not given a wait time; the limiter runs before
/// the caller opens its marker so the new attempt does not count against
/// itself.
async fn attempt_gates(db: &SqlitePool, player: PlayerId) -> Result<Option<Rejection>> {
    if attempt_repo::has_active(db, player, AttemptKind::Signup).await? {
        return Ok(Some(Rejection::ActiveSignupAttempt));
    }
    if attempt_repo::has_active(db, player, AttemptKind::Unsign).await? {
        return Ok(Some(Rejection::ActiveUnsignAttempt));
    }

    for kind in [AttemptKind::Signup, AttemptKind::Unsign] {
        let remaining = rate_limit::time_until_allowed(db, player, kind).await?;
        if remaining > Duration::zero() {
            return Ok(Some(Rejection::RateLimited { kind, remaining }));
        }
    }

    Ok(None)
}
