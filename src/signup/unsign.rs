//! Unsign workflow: list a player's active slots, revoke the one picked.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::db::models::{AttemptKind, PlayerId};
use crate::db::{attempt_repo, record_repo};
use crate::protocol::Controls;
use crate::signup::engine::EngineCtx;
use crate::signup::guard::UnsignClearance;

/// Body of one unsign workflow. Exactly one slot is revoked per
/// invocation; the record is deactivated, never deleted.
pub async fn run(
    ctx: &EngineCtx,
    player: PlayerId,
    clearance: UnsignClearance,
    mut rx: mpsc::Receiver<i64>,
) -> Result<()> {
    let menu = Controls::unsign_menu(&clearance.slots);
    let message = ctx
        .transport
        .send_prompt(player, "Select a country to unsign from!", menu.clone())
        .await?;

    while let Some(value) = rx.recv().await {
        if !menu.offers(value) {
            log::debug!("player {player} selected record {value} not on the unsign menu");
            continue;
        }

        record_repo::deactivate(&ctx.db, value).await?;
        if let Some(placeholder) = menu.chosen_placeholder(value) {
            ctx.transport.latch(message, &placeholder).await?;
        }
        ctx.transport
            .send_dm(player, "You have been unsigned from the game!")
            .await?;
        break;
    }

    attempt_repo::end_all(&ctx.db, player, AttemptKind::Unsign).await?;
    Ok(())
}
