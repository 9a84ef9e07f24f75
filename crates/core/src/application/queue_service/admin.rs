// Admin Use Cases: create / delete queues
//
// Authorization is the caller's job: the RPC layer performs the admin
// capability check before these are ever invoked.

use super::retry::with_conflict_retry;
use crate::domain::{DomainError, Queue, QueueId};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, QueueRepository, QueueTransaction, TimeProvider, TransactionalQueueRepository,
};
use serde::{Deserialize, Serialize};
use tracing::info;

const MAX_QUEUE_NAME_LEN: usize = 100;

/// Create-queue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueueRequest {
    pub name: String,

    #[serde(default)]
    pub max_capacity: Option<i64>,
}

pub(crate) fn validate_request(req: &CreateQueueRequest) -> Result<()> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("queue name must not be empty".to_string()));
    }
    if name.len() > MAX_QUEUE_NAME_LEN {
        return Err(AppError::Validation(format!(
            "queue name too long ({} > {} chars)",
            name.len(),
            MAX_QUEUE_NAME_LEN
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(AppError::Validation(
            "queue name must be alphanumeric, space, '-' or '_'".to_string(),
        ));
    }
    if let Some(cap) = req.max_capacity {
        if cap < 1 {
            return Err(AppError::Validation(format!(
                "max_capacity out of range: {} (must be >= 1)",
                cap
            )));
        }
    }
    Ok(())
}

/// Create a new queue
pub async fn create_queue(
    repo: &dyn QueueRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: CreateQueueRequest,
) -> Result<Queue> {
    validate_request(&req)?;

    let queue = Queue::new(
        id_provider.generate_id(),
        req.name.trim(),
        req.max_capacity,
        time_provider.now_millis(),
    );

    repo.insert_queue(&queue).await?;

    info!(queue_id = %queue.id, name = %queue.name, "Queue created");

    Ok(queue)
}

/// Delete a queue, cascading deletion of all its entries.
///
/// Returns the number of entries that were removed.
pub async fn delete_queue(
    repo: &dyn TransactionalQueueRepository,
    queue_id: &str,
) -> Result<u64> {
    let queue_id: QueueId = queue_id.to_string();

    let removed_entries =
        with_conflict_retry("delete_queue", &queue_id, || delete_once(repo, &queue_id)).await?;

    info!(queue_id = %queue_id, removed_entries, "Queue deleted");
    Ok(removed_entries)
}

async fn delete_once(repo: &dyn TransactionalQueueRepository, queue_id: &QueueId) -> Result<u64> {
    let mut tx = repo.begin_transaction().await?;

    match delete_in_tx(tx.as_mut(), queue_id).await {
        Ok(removed_entries) => {
            tx.commit().await?;
            Ok(removed_entries)
        }
        Err(err) => {
            let _ = tx.rollback().await;
            Err(err)
        }
    }
}

async fn delete_in_tx(tx: &mut dyn QueueTransaction, queue_id: &QueueId) -> Result<u64> {
    // ORM-style cascade becomes two explicit statements, entries first
    let removed_entries = tx.delete_queue_entries(queue_id).await?;
    let removed_queues = tx.delete_queue(queue_id).await?;
    if removed_queues == 0 {
        return Err(DomainError::QueueNotFound(queue_id.clone()).into());
    }
    Ok(removed_entries)
}
