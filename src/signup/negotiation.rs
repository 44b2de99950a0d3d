//! Signup negotiation state machine.
//!
//! One instance per admitted signup workflow. Transitions are driven by
//! player selections (and the peer approval result) and return the list
//! of actions the engine must perform; the machine itself never touches
//! the transport. Store reads happen inside transitions because the
//! controller branch depends on shared slot state; those reads and the
//! final commit are not covered by one transaction, so two players can
//! race for the same role between snapshot and commit, and the last
//! writer wins (accepted model, see DESIGN.md).

use anyhow::{bail, Result};
use sqlx::SqlitePool;

use crate::db::models::{Controller, CountryId, GameId, PlayerId, SlotOption};
use crate::db::{country_repo, record_repo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupState {
    AwaitingCountry,
    AwaitingController { country: CountryId },
    AwaitingApproval { country: CountryId, primary: PlayerId },
    AwaitingOption { country: CountryId, controller: Controller },
    Committed,
    Denied,
}

/// Player-facing notifications produced by transitions. Kept as data so
/// the flow is testable without a transport; `text()` is the one thin
/// rendering step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MinorAutoPrimary,
    PrimaryTakenNeedsApproval,
    SecondaryTakenAutoPrimary,
    ControllerRoles,
    OptionMeaning,
    AutoOption(SlotOption),
    Committed {
        country: String,
        controller: Controller,
        option: SlotOption,
    },
    RequestDenied,
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::MinorAutoPrimary => {
                "The nation you are signing up is not a major, so you were automatically \
                 signed up for the **primary controller**."
                    .into()
            }
            Notice::PrimaryTakenNeedsApproval => {
                "This country already has **primary controller**. In order to sign up for \
                 the **secondary controller**, you need confirmation from the primary \
                 controller."
                    .into()
            }
            Notice::SecondaryTakenAutoPrimary => {
                "This country already has **secondary controller**. As such, you were \
                 signed for primary controller."
                    .into()
            }
            Notice::ControllerRoles => {
                "**Primary Controller** is responsible for the main parts of the nation \
                 management. **Secondary Controller (CO-OP)** is the helping player, only \
                 available for **major** countries, and needs the primary controller's \
                 permission (the bot handles those requests)."
                    .into()
            }
            Notice::OptionMeaning => {
                "**First Option** is your primary country selection. If you were to be \
                 moved, you are likely to end up playing your **Second Option**. You can \
                 only have one of each."
                    .into()
            }
            Notice::AutoOption(SlotOption::First) => {
                "You are already signed up for the second option. As such, you were \
                 automatically signed for first option."
                    .into()
            }
            Notice::AutoOption(SlotOption::Second) => {
                "You are already signed up for the first option. As such, you were \
                 automatically signed for second option."
                    .into()
            }
            Notice::Committed {
                country,
                controller,
                option,
            } => format!(
                "Confirming signup for **{country}** as **{}** for **{}**.",
                controller.label(),
                option.label()
            ),
            Notice::RequestDenied => "Your request for secondary controller was denied.".into(),
        }
    }
}

/// What the engine must do after a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Notify(Notice),
    PromptController,
    PromptOption,
    RequestApproval {
        primary: PlayerId,
        country_name: String,
    },
    Commit {
        country: CountryId,
        country_name: String,
        controller: Controller,
        option: SlotOption,
    },
}

#[derive(Debug)]
pub struct Negotiation {
    pub game: GameId,
    pub player: PlayerId,
    pub tag: String,
    /// Option forced by a record the player already holds; skips the
    /// option menu. Computed once at entry and not re-checked at commit.
    preset_option: Option<SlotOption>,
    state: SignupState,
    country_name: String,
}

impl Negotiation {
    pub fn new(
        game: GameId,
        player: PlayerId,
        tag: String,
        preset_option: Option<SlotOption>,
    ) -> Self {
        Negotiation {
            game,
            player,
            tag,
            preset_option,
            state: SignupState::AwaitingCountry,
            country_name: String::new(),
        }
    }

    pub fn state(&self) -> &SignupState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SignupState::Committed | SignupState::Denied)
    }

    /// Country picked from the availability menu. Decides the controller
    /// branch: minors force primary; a claimed primary forces the approval
    /// handshake; a claimed secondary forces primary; an unclaimed major
    /// leaves the controller menu open.
    pub async fn on_country(&mut self, db: &SqlitePool, country: CountryId) -> Result<Vec<Action>> {
        if self.state != SignupState::AwaitingCountry {
            bail!("country selection in state {:?}", self.state);
        }

        self.country_name = country_repo::name(db, country).await?;

        if !country_repo::is_major(db, country).await? {
            let mut actions = vec![Action::Notify(Notice::MinorAutoPrimary)];
            actions.extend(self.resolve_option(country, Controller::Primary));
            return Ok(actions);
        }

        if record_repo::has_controller(db, self.game, country, Controller::Primary).await? {
            let primary = record_repo::primary_controller(db, self.game, country).await?;
            self.state = SignupState::AwaitingApproval { country, primary };
            return Ok(vec![
                Action::Notify(Notice::PrimaryTakenNeedsApproval),
                Action::Notify(Notice::ControllerRoles),
                Action::RequestApproval {
                    primary,
                    country_name: self.country_name.clone(),
                },
            ]);
        }

        if record_repo::has_controller(db, self.game, country, Controller::Secondary).await? {
            let mut actions = vec![
                Action::Notify(Notice::SecondaryTakenAutoPrimary),
                Action::Notify(Notice::ControllerRoles),
            ];
            actions.extend(self.resolve_option(country, Controller::Primary));
            return Ok(actions);
        }

        // First signer of a major picks either role; a secondary-first
        // signup is allowed.
        self.state = SignupState::AwaitingController { country };
        Ok(vec![
            Action::PromptController,
            Action::Notify(Notice::ControllerRoles),
        ])
    }

    /// Controller role picked from the open menu (unclaimed major only).
    pub fn on_controller(&mut self, controller: Controller) -> Result<Vec<Action>> {
        let SignupState::AwaitingController { country } = self.state.clone() else {
            bail!("controller selection in state {:?}", self.state);
        };
        Ok(self.resolve_option(country, controller))
    }

    /// Primary controller's confirm/deny decision (or an elapsed approval
    /// timeout, which arrives here as a denial).
    pub fn on_approval(&mut self, approved: bool) -> Result<Vec<Action>> {
        let SignupState::AwaitingApproval { country, .. } = self.state.clone() else {
            bail!("approval decision in state {:?}", self.state);
        };
        if approved {
            Ok(self.resolve_option(country, Controller::Secondary))
        } else {
            self.state = SignupState::Denied;
            Ok(vec![Action::Notify(Notice::RequestDenied)])
        }
    }

    /// Option rank picked from the open menu.
    pub fn on_option(&mut self, option: SlotOption) -> Result<Vec<Action>> {
        let SignupState::AwaitingOption { country, controller } = self.state.clone() else {
            bail!("option selection in state {:?}", self.state);
        };
        self.state = SignupState::Committed;
        Ok(vec![Action::Commit {
            country,
            country_name: self.country_name.clone(),
            controller,
            option,
        }])
    }

    /// Once the controller is settled: commit straight away when the
    /// option was pre-resolved at entry, otherwise open the option menu.
    fn resolve_option(&mut self, country: CountryId, controller: Controller) -> Vec<Action> {
        let mut actions = vec![Action::Notify(Notice::OptionMeaning)];
        match self.preset_option {
            Some(option) => {
                self.state = SignupState::Committed;
                actions.push(Action::Notify(Notice::AutoOption(option)));
                actions.push(Action::Commit {
                    country,
                    country_name: self.country_name.clone(),
                    controller,
                    option,
                });
            }
            None => {
                self.state = SignupState::AwaitingOption { country, controller };
                actions.push(Action::PromptOption);
            }
        }
        actions
    }
}
