// Advance Use Case (complete / remove)

use super::retry::with_conflict_retry;
use crate::domain::{DomainError, EntryStatus, QueueEntry};
use crate::error::Result;
use crate::port::{QueueTransaction, TimeProvider, TransactionalQueueRepository};
use serde::{Deserialize, Serialize};

/// What to do with the targeted entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceAction {
    /// Mark completed; the entry is retained for history with its position frozen
    Complete,
    /// Hard-delete the entry
    Remove,
}

impl AdvanceAction {
    /// Parse the caller-supplied action token. Fails with `InvalidAction`
    /// before any store access.
    pub fn parse(s: &str) -> crate::domain::error::Result<Self> {
        match s {
            "complete" => Ok(AdvanceAction::Complete),
            "remove" => Ok(AdvanceAction::Remove),
            other => Err(DomainError::InvalidAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for AdvanceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvanceAction::Complete => write!(f, "complete"),
            AdvanceAction::Remove => write!(f, "remove"),
        }
    }
}

/// Advance request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub queue_id: String,
    pub user_id: String,
    /// "complete" or "remove"
    pub action: String,
}

/// Result of an advance: the affected entry as it ended up (for `remove`,
/// as it was before deletion), plus the waiting entry now at the head of
/// the queue so the caller can notify that user. The engine itself never
/// dispatches notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub entry: QueueEntry,
    pub next_waiting: Option<QueueEntry>,
}

/// Execute advance use case.
///
/// Neither action renumbers the remaining waiting entries: position is join
/// order, not a compacted rank. Racing terminal transitions are safe - the
/// second of two completes is a no-op, the second of two removes reports
/// `EntryNotFound`.
pub async fn execute(
    repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    req: AdvanceRequest,
) -> Result<AdvanceOutcome> {
    let action = AdvanceAction::parse(&req.action)?;

    with_conflict_retry("advance", &req.user_id, || {
        advance_once(repo, time_provider, &req, action)
    })
    .await
}

/// One advance attempt: a full transaction, committed on success and
/// rolled back on every error path.
async fn advance_once(
    repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    req: &AdvanceRequest,
    action: AdvanceAction,
) -> Result<AdvanceOutcome> {
    let mut tx = repo.begin_transaction().await?;

    match advance_in_tx(tx.as_mut(), time_provider, req, action).await {
        Ok(outcome) => {
            tx.commit().await?;
            Ok(outcome)
        }
        Err(err) => {
            let _ = tx.rollback().await;
            Err(err)
        }
    }
}

async fn advance_in_tx(
    tx: &mut dyn QueueTransaction,
    time_provider: &dyn TimeProvider,
    req: &AdvanceRequest,
    action: AdvanceAction,
) -> Result<AdvanceOutcome> {
    let entry_not_found = || DomainError::EntryNotFound {
        queue_id: req.queue_id.clone(),
        user_id: req.user_id.clone(),
    };

    // Any status is accepted for lookup; the action decides what is legal
    let mut entry = tx
        .find_entry(&req.queue_id, &req.user_id)
        .await?
        .ok_or_else(entry_not_found)?;

    match action {
        AdvanceAction::Complete => match entry.status {
            EntryStatus::Waiting => {
                entry.complete(time_provider.now_millis())?;
                tx.update_entry(&entry).await?;
            }
            // Second writer of a racing double-complete: no-op
            EntryStatus::Completed => {}
            EntryStatus::Canceled => {
                return Err(DomainError::InvalidStatusTransition {
                    from: entry.status.to_string(),
                    to: "COMPLETED".to_string(),
                }
                .into());
            }
        },
        AdvanceAction::Remove => {
            let deleted = tx.delete_entry(&entry.id).await?;
            if deleted == 0 {
                // A concurrent remove won the race
                return Err(entry_not_found().into());
            }
        }
    }

    let next_waiting = tx.first_waiting(&req.queue_id).await?;

    Ok(AdvanceOutcome { entry, next_waiting })
}
