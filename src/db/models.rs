//! Row types and the small wire enums shared across the crate.

use sqlx::FromRow;

/// Identities handed to us by the chat platform / store. All small
/// integers on the wire.
pub type PlayerId = i64;
pub type GameId = i64;
pub type CountryId = i64;
pub type RecordId = i64;

/// Controller role on a country. Majors admit both, minors only primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Primary,
    Secondary,
}

impl Controller {
    pub fn as_i64(self) -> i64 {
        match self {
            Controller::Primary => 1,
            Controller::Secondary => 2,
        }
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            1 => Some(Controller::Primary),
            2 => Some(Controller::Secondary),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Controller::Primary => "Primary Controller",
            Controller::Secondary => "Secondary Controller (CO-OP)",
        }
    }
}

/// Preference rank of a signed slot. A player holds at most one active
/// record per option and game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOption {
    First,
    Second,
}

impl SlotOption {
    pub fn as_i64(self) -> i64 {
        match self {
            SlotOption::First => 1,
            SlotOption::Second => 2,
        }
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            1 => Some(SlotOption::First),
            2 => Some(SlotOption::Second),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SlotOption::First => "First Option",
            SlotOption::Second => "Second Option",
        }
    }

    pub fn other(self) -> Self {
        match self {
            SlotOption::First => SlotOption::Second,
            SlotOption::Second => SlotOption::First,
        }
    }
}

/// The two workflow families tracked by the attempt ledger. Each kind has
/// its own table so the limiter windows stay independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Signup,
    Unsign,
}

impl AttemptKind {
    pub fn table(self) -> &'static str {
        match self {
            AttemptKind::Signup => "signup_attempts",
            AttemptKind::Unsign => "unsign_attempts",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            AttemptKind::Signup => "sign up",
            AttemptKind::Unsign => "unsign",
        }
    }
}

#[derive(Debug, FromRow)]
pub struct Player {
    pub player_id: PlayerId,
    pub discord_tag: String,
}

#[derive(Debug, FromRow)]
pub struct Country {
    pub country_id: CountryId,
    pub name: String,
    pub emoji: String,
    pub is_major: i64,
}

#[derive(Debug, FromRow)]
pub struct GameRecord {
    pub record_id: RecordId,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub country_id: CountryId,
    pub faction_id: i64,
    pub controller: i64,
    pub option: i64,
    pub is_active: i64,
    pub signup_time: String,
}

/// One entry of the availability menu: (id, name, emoji), sorted by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryChoice {
    pub country_id: CountryId,
    pub name: String,
    pub emoji: String,
}

/// One active slot a player holds, as shown in the unsign menu.
#[derive(Debug, Clone)]
pub struct SignedSlot {
    pub record_id: RecordId,
    pub country_name: String,
    pub controller: Controller,
    pub option: SlotOption,
}
