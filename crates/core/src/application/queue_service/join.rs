// Join Use Case

use super::retry::with_conflict_retry;
use crate::domain::{DomainError, QueueEntry};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, QueueTransaction, TimeProvider, TransactionalQueueRepository};
use serde::{Deserialize, Serialize};

/// Join request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub queue_id: String,
    pub user_id: String,
}

pub(crate) fn validate_request(req: &JoinRequest) -> Result<()> {
    if req.queue_id.trim().is_empty() {
        return Err(AppError::Validation("queue_id must not be empty".to_string()));
    }
    if req.user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id must not be empty".to_string()));
    }
    Ok(())
}

/// Execute join use case (with transaction for atomicity)
///
/// Within a single transaction: check for an existing waiting entry for
/// (queue, user), enforce the capacity bound, compute
/// `position = max waiting position + 1` (1 when the queue has no waiting
/// entries), and insert. The store serializes the max-then-insert sequence
/// per queue; a lost race comes back as `TransactionConflict` and is
/// retried here with bounded backoff.
///
/// # Arguments
///
/// * `repo` - Transactional queue repository
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Join request
pub async fn execute(
    repo: &dyn TransactionalQueueRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: JoinRequest,
) -> Result<QueueEntry> {
    validate_request(&req)?;

    with_conflict_retry("join", &req.user_id, || {
        join_once(repo, id_provider, time_provider, &req)
    })
    .await
}

/// One join attempt: a full transaction, committed on success and rolled
/// back on every error path.
async fn join_once(
    repo: &dyn TransactionalQueueRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: &JoinRequest,
) -> Result<QueueEntry> {
    let mut tx = repo.begin_transaction().await?;

    match join_in_tx(tx.as_mut(), id_provider, time_provider, req).await {
        Ok(entry) => {
            tx.commit().await?;
            Ok(entry)
        }
        Err(err) => {
            // Rollback failures are secondary; the original error wins
            let _ = tx.rollback().await;
            Err(err)
        }
    }
}

async fn join_in_tx(
    tx: &mut dyn QueueTransaction,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: &JoinRequest,
) -> Result<QueueEntry> {
    let queue = tx
        .find_queue(&req.queue_id)
        .await?
        .ok_or_else(|| DomainError::QueueNotFound(req.queue_id.clone()))?;

    // No duplicate active membership for the same (queue, user)
    if tx
        .find_waiting_entry(&req.queue_id, &req.user_id)
        .await?
        .is_some()
    {
        return Err(DomainError::AlreadyQueued {
            queue_id: req.queue_id.clone(),
            user_id: req.user_id.clone(),
        }
        .into());
    }

    if let Some(max_capacity) = queue.max_capacity {
        let waiting = tx.count_waiting(&req.queue_id).await?;
        if waiting >= max_capacity {
            return Err(DomainError::QueueFull {
                queue_id: req.queue_id.clone(),
                max_capacity,
            }
            .into());
        }
    }

    // Positions of completed entries stay frozen and do not count here
    let position = tx.max_waiting_position(&req.queue_id).await?.unwrap_or(0) + 1;

    let entry = QueueEntry::new(
        id_provider.generate_id(),
        req.queue_id.clone(),
        req.user_id.clone(),
        position,
        time_provider.now_millis(),
    );

    tx.insert_entry(&entry).await?;

    Ok(entry)
}
