//! Event dispatch and the per-player workflow actors.
//!
//! One task per admitted workflow, fed through an mpsc channel held in a
//! process-wide registry. The registry only stops a single player from
//! running two workflows at once (backed by the attempt ledger); it does
//! not serialize different players racing for the same slot. That race
//! is accepted, last writer wins.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use crate::clock::Clock;
use crate::config::settings;
use crate::db::models::{AttemptKind, Controller, GameId, PlayerId, SlotOption};
use crate::db::{attempt_repo, country_repo, player_repo, record_repo};
use crate::protocol::{Controls, Inbound};
use crate::signup::guard::{self, Gate, SignupClearance};
use crate::signup::negotiation::{Action, Negotiation, Notice, SignupState};
use crate::signup::{approval, unsign};
use crate::transport::{MessageId, Transport};

/// Shared handles every workflow needs. Injected explicitly into
/// [`dispatch`]; nothing here is ambient.
#[derive(Clone)]
pub struct EngineCtx {
    pub db: SqlitePool,
    pub transport: Arc<dyn Transport>,
    pub clock: Arc<dyn Clock>,
}

/// Live workflows: player id → selection sender. At most one per player,
/// mirroring the one-active-attempt ledger invariant.
static WORKFLOWS: Lazy<DashMap<PlayerId, mpsc::Sender<i64>>> = Lazy::new(DashMap::new);

/// Is a workflow task currently running for this player?
pub fn workflow_active(player: PlayerId) -> bool {
    WORKFLOWS.contains_key(&player)
}

/// Route one inbound interaction event. Button presses may admit and
/// spawn a workflow; selections and approval decisions are forwarded to
/// whoever is waiting for them, and silently dropped when nobody is
/// (stale menu instances).
pub async fn dispatch(ctx: &EngineCtx, event: Inbound) -> Result<()> {
    match event {
        Inbound::SignupPressed {
            game_id,
            player_id,
            tag,
        } => signup_pressed(ctx, game_id, player_id, tag).await,
        Inbound::UnsignPressed {
            game_id,
            player_id,
            tag,
        } => unsign_pressed(ctx, game_id, player_id, tag).await,
        Inbound::Selected { player_id, value } => {
            let sender = WORKFLOWS.get(&player_id).map(|e| e.value().clone());
            match sender {
                Some(tx) => {
                    if tx.send(value).await.is_err() {
                        log::debug!("workflow of player {player_id} ended mid-selection");
                    }
                }
                None => log::debug!("selection {value} from player {player_id} with no workflow"),
            }
            Ok(())
        }
        Inbound::ApprovalDecision {
            request_id,
            approver_id,
            approve,
        } => {
            match approval::resolve(request_id, approver_id, approve) {
                Some(message) => {
                    if let Some(message) = message {
                        let word = if approve { "Confirmed!" } else { "Denied!" };
                        ctx.transport.latch(message, word).await?;
                    }
                    ctx.transport
                        .reply(approver_id, if approve { "Confirmed!" } else { "Denied!" })
                        .await?;
                }
                None => log::debug!("stale approval decision for request {request_id}"),
            }
            Ok(())
        }
    }
}

async fn signup_pressed(
    ctx: &EngineCtx,
    game: GameId,
    player: PlayerId,
    tag: String,
) -> Result<()> {
    let clearance =
        match guard::preflight_signup(&ctx.db, ctx.transport.as_ref(), game, player).await? {
            Gate::Rejected(rejection) => {
                ctx.transport
                    .reply(player, &rejection.player_message())
                    .await?;
                return Ok(());
            }
            Gate::Cleared(clearance) => clearance,
        };

    player_repo::insert_if_missing(&ctx.db, player, &tag).await?;
    attempt_repo::begin(&ctx.db, player, AttemptKind::Signup, ctx.clock.now()).await?;

    let (tx, rx) = mpsc::channel(8);
    WORKFLOWS.insert(player, tx);

    let ctx = ctx.clone();
    tokio::spawn(async move {
        if let Err(e) = run_signup(&ctx, game, player, tag, clearance, rx).await {
            log::error!("signup workflow of player {player} failed: {e:?}");
            let _ = attempt_repo::end_all(&ctx.db, player, AttemptKind::Signup).await;
        }
        WORKFLOWS.remove(&player);
    });
    Ok(())
}

async fn unsign_pressed(
    ctx: &EngineCtx,
    game: GameId,
    player: PlayerId,
    _tag: String,
) -> Result<()> {
    let clearance =
        match guard::preflight_unsign(&ctx.db, ctx.transport.as_ref(), game, player).await? {
            Gate::Rejected(rejection) => {
                ctx.transport
                    .reply(player, &rejection.player_message())
                    .await?;
                return Ok(());
            }
            Gate::Cleared(clearance) => clearance,
        };

    attempt_repo::begin(&ctx.db, player, AttemptKind::Unsign, ctx.clock.now()).await?;

    let (tx, rx) = mpsc::channel(8);
    WORKFLOWS.insert(player, tx);

    let ctx = ctx.clone();
    tokio::spawn(async move {
        if let Err(e) = unsign::run(&ctx, player, clearance, rx).await {
            log::error!("unsign workflow of player {player} failed: {e:?}");
            let _ = attempt_repo::end_all(&ctx.db, player, AttemptKind::Unsign).await;
        }
        WORKFLOWS.remove(&player);
    });
    Ok(())
}

/// Body of one signup negotiation: render the country menu, then feed
/// selections through the state machine until it reaches a terminal
/// state. The task parks on the channel between selections and inside
/// the approval handshake.
async fn run_signup(
    ctx: &EngineCtx,
    game: GameId,
    player: PlayerId,
    tag: String,
    clearance: SignupClearance,
    mut rx: mpsc::Receiver<i64>,
) -> Result<()> {
    let mut machine = Negotiation::new(game, player, tag, clearance.preset_option);

    let intro = "In order to sign up for the game, first select a country you want to \
                 play as. We highly recommend to select a **minor** nation if you have \
                 little to none experience.";
    let menu = Controls::country_menu(&clearance.countries);
    let message = ctx.transport.send_prompt(player, intro, menu.clone()).await?;
    let mut open_menu: Option<(MessageId, Controls)> = Some((message, menu));

    while !machine.is_terminal() {
        let Some(value) = rx.recv().await else {
            break;
        };

        let Some((message, controls)) = open_menu.take() else {
            log::debug!("selection {value} from player {player} with no open menu");
            continue;
        };
        if !controls.offers(value) {
            log::debug!("player {player} selected {value} not on the current menu");
            open_menu = Some((message, controls));
            continue;
        }
        if let Some(placeholder) = controls.chosen_placeholder(value) {
            ctx.transport.latch(message, &placeholder).await?;
        }

        let actions = match machine.state().clone() {
            SignupState::AwaitingCountry => machine.on_country(&ctx.db, value).await?,
            SignupState::AwaitingController { .. } => {
                let Some(controller) = Controller::from_i64(value) else {
                    continue;
                };
                machine.on_controller(controller)?
            }
            SignupState::AwaitingOption { .. } => {
                let Some(option) = SlotOption::from_i64(value) else {
                    continue;
                };
                machine.on_option(option)?
            }
            state => {
                log::debug!("selection {value} from player {player} in state {state:?}");
                continue;
            }
        };

        perform(ctx, &mut machine, actions, &mut open_menu).await?;
    }

    attempt_repo::end_all(&ctx.db, player, AttemptKind::Signup).await?;
    Ok(())
}

/// Execute the actions a transition produced, in order. The approval
/// handshake suspends here and feeds its outcome straight back into the
/// machine, so follow-up actions are queued rather than recursed into.
async fn perform(
    ctx: &EngineCtx,
    machine: &mut Negotiation,
    actions: Vec<Action>,
    open_menu: &mut Option<(MessageId, Controls)>,
) -> Result<()> {
    let player = machine.player;
    let mut queue: VecDeque<Action> = actions.into();

    while let Some(action) = queue.pop_front() {
        match action {
            Action::Notify(notice) => {
                ctx.transport.send_dm(player, &notice.text()).await?;
            }
            Action::PromptController => {
                let menu = Controls::controller_menu();
                let message = ctx
                    .transport
                    .send_prompt(player, "Select a controller type!", menu.clone())
                    .await?;
                *open_menu = Some((message, menu));
            }
            Action::PromptOption => {
                let menu = Controls::option_menu();
                let message = ctx
                    .transport
                    .send_prompt(player, "Is this your first or second option?", menu.clone())
                    .await?;
                *open_menu = Some((message, menu));
            }
            Action::RequestApproval {
                primary,
                country_name,
            } => {
                let (request_id, decision_rx) = approval::register(primary);
                let text = format!(
                    "**{}** wants to be the **secondary controller** for **{country_name}**. \
                     Do you confirm?",
                    machine.tag
                );
                let message = ctx
                    .transport
                    .send_prompt(primary, &text, Controls::ConfirmDeny { request_id })
                    .await?;
                approval::attach_message(request_id, message);

                let approved = approval::await_decision(
                    request_id,
                    decision_rx,
                    settings().approval_timeout_secs,
                )
                .await;
                queue.extend(machine.on_approval(approved)?);
            }
            Action::Commit {
                country,
                country_name,
                controller,
                option,
            } => {
                let faction = country_repo::faction_id(&ctx.db, country).await?;
                record_repo::insert(
                    &ctx.db,
                    machine.game,
                    player,
                    country,
                    faction,
                    controller,
                    option,
                    ctx.clock.now(),
                )
                .await?;
                let confirmation = Notice::Committed {
                    country: country_name,
                    controller,
                    option,
                };
                ctx.transport.send_dm(player, &confirmation.text()).await?;
            }
        }
    }
    Ok(())
}

/// Convenience wrapper for hosts: bootstrap tables and clear attempts
/// left open by a previous process (restart / new-session reset).
pub async fn startup_reset(db: &SqlitePool) -> Result<()> {
    crate::db::schema::init(db).await?;
    crate::db::schema::reset_attempts(db).await?;
    Ok(())
}
