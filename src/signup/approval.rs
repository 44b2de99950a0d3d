//! Cross-player secondary-controller handshake.
//!
//! The requester's workflow parks on a oneshot until the primary
//! controller presses CONFIRM or DENY. There is no expiry unless the host
//! configures one; an elapsed timeout counts as a denial.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::db::models::PlayerId;
use crate::transport::MessageId;

struct Pending {
    approver: PlayerId,
    /// The confirm/deny prompt, once delivered, so it can be latched.
    message: Option<MessageId>,
    tx: oneshot::Sender<bool>,
}

/// Requests awaiting a decision, keyed by a process-local id.
static PENDING: Lazy<DashMap<u64, Pending>> = Lazy::new(DashMap::new);
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Register a request addressed to `approver`. The returned receiver
/// resolves with the decision.
pub fn register(approver: PlayerId) -> (u64, oneshot::Receiver<bool>) {
    let (tx, rx) = oneshot::channel();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    PENDING.insert(
        id,
        Pending {
            approver,
            message: None,
            tx,
        },
    );
    (id, rx)
}

/// Record the delivered prompt so [`resolve`] can hand it back for
/// latching.
pub fn attach_message(request: u64, message: MessageId) {
    if let Some(mut entry) = PENDING.get_mut(&request) {
        entry.message = Some(message);
    }
}

/// Feed a decision into a pending request. Returns the prompt message for
/// latching, or `None` when the request is unknown, already resolved, or
/// the decision came from someone other than the addressed approver.
pub fn resolve(request: u64, approver: PlayerId, approve: bool) -> Option<Option<MessageId>> {
    {
        let entry = PENDING.get(&request)?;
        if entry.approver != approver {
            log::warn!(
                "player {approver} answered approval request {request} addressed to {}",
                entry.approver
            );
            return None;
        }
    }
    let (_, pending) = PENDING.remove(&request)?;
    // The requester may already be gone (configured timeout elapsed).
    let _ = pending.tx.send(approve);
    Some(pending.message)
}

/// Park until the decision arrives. With a configured bound, an elapsed
/// timeout removes the request and counts as denial; a dropped sender
/// counts as denial too.
pub async fn await_decision(
    request: u64,
    rx: oneshot::Receiver<bool>,
    timeout_secs: Option<u64>,
) -> bool {
    match timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), rx).await {
            Ok(decision) => decision.unwrap_or(false),
            Err(_) => {
                PENDING.remove(&request);
                log::info!("approval request {request} timed out");
                false
            }
        },
        None => rx.await.unwrap_or(false),
    }
}
