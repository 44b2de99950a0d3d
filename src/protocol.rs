//! Interaction protocol shared by the platform shell and the workflow
//! engine: inbound button/menu events and outbound control sets.

use serde::{Deserialize, Serialize};

use crate::db::models::{CountryChoice, GameId, PlayerId, SignedSlot};

// ---------- platform → engine ----------
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// SIGN UP button on the standings message.
    SignupPressed {
        game_id: GameId,
        player_id: PlayerId,
        tag: String,
    },
    /// UNSIGN button on the standings message.
    UnsignPressed {
        game_id: GameId,
        player_id: PlayerId,
        tag: String,
    },
    /// A value picked from any menu previously sent to this player.
    Selected { player_id: PlayerId, value: i64 },
    /// CONFIRM/DENY press on a secondary-controller request.
    ApprovalDecision {
        request_id: u64,
        approver_id: PlayerId,
        approve: bool,
    },
}

// ---------- engine → platform ----------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub value: i64,
    pub emoji: Option<String>,
}

/// Interactive control set attached to an outbound message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Controls {
    Menu {
        placeholder: String,
        entries: Vec<MenuEntry>,
    },
    ConfirmDeny { request_id: u64 },
}

impl Controls {
    pub fn country_menu(countries: &[CountryChoice]) -> Self {
        Controls::Menu {
            placeholder: "Select a country!".into(),
            entries: countries
                .iter()
                .map(|c| MenuEntry {
                    label: c.name.clone(),
                    value: c.country_id,
                    emoji: Some(c.emoji.clone()),
                })
                .collect(),
        }
    }

    pub fn controller_menu() -> Self {
        Controls::Menu {
            placeholder: "Select a Controller Type".into(),
            entries: vec![
                MenuEntry {
                    label: "Primary Controller".into(),
                    value: 1,
                    emoji: Some("🅿️".into()),
                },
                MenuEntry {
                    label: "Secondary Controller (CO-OP)".into(),
                    value: 2,
                    emoji: Some("🇸".into()),
                },
            ],
        }
    }

    pub fn option_menu() -> Self {
        Controls::Menu {
            placeholder: "Select an option".into(),
            entries: vec![
                MenuEntry {
                    label: "First Option".into(),
                    value: 1,
                    emoji: Some("1️⃣".into()),
                },
                MenuEntry {
                    label: "Second Option".into(),
                    value: 2,
                    emoji: Some("2️⃣".into()),
                },
            ],
        }
    }

    pub fn unsign_menu(slots: &[SignedSlot]) -> Self {
        Controls::Menu {
            placeholder: "Select country to unsign".into(),
            entries: slots
                .iter()
                .map(|s| MenuEntry {
                    label: format!(
                        "{} ({}) - {}",
                        s.country_name,
                        s.controller.label(),
                        s.option.label()
                    ),
                    value: s.record_id,
                    emoji: None,
                })
                .collect(),
        }
    }

    /// Latch placeholder shown once an entry of this menu was chosen.
    pub fn chosen_placeholder(&self, value: i64) -> Option<String> {
        match self {
            Controls::Menu { entries, .. } => entries.iter().find(|e| e.value == value).map(|e| {
                match &e.emoji {
                    Some(emoji) => format!("{emoji}  {}", e.label),
                    None => e.label.clone(),
                }
            }),
            Controls::ConfirmDeny { .. } => None,
        }
    }

    /// Is `value` one of the offered entries? Selections not on the menu
    /// (stale or forged) are dropped by the engine.
    pub fn offers(&self, value: i64) -> bool {
        match self {
            Controls::Menu { entries, .. } => entries.iter().any(|e| e.value == value),
            Controls::ConfirmDeny { .. } => false,
        }
    }
}
