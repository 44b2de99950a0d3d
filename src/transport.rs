//! Delivery seam to the chat platform. The real implementation wraps the
//! platform SDK; tests use a recording mock.

use anyhow::Result;
use async_trait::async_trait;

use crate::db::models::PlayerId;
use crate::protocol::Controls;

/// Platform-assigned id of a delivered message, used to latch its menu
/// once answered.
pub type MessageId = i64;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Can we open a private channel to this player right now? A closed
    /// DM gate fails the whole workflow before any state is written.
    async fn dm_reachable(&self, player: PlayerId) -> bool;

    /// Private fire-and-forget text.
    async fn send_dm(&self, player: PlayerId, text: &str) -> Result<MessageId>;

    /// Private text with an attached control set (menu or buttons).
    async fn send_prompt(
        &self,
        player: PlayerId,
        text: &str,
        controls: Controls,
    ) -> Result<MessageId>;

    /// Short private report answering the interaction that triggered a
    /// precondition failure.
    async fn reply(&self, player: PlayerId, text: &str) -> Result<()>;

    /// Replace an answered control set with a disabled placeholder so the
    /// same menu instance cannot be submitted twice.
    async fn latch(&self, message: MessageId, placeholder: &str) -> Result<()>;
}
