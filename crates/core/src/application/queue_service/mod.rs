// Queue Service - the queue position engine use cases

pub mod admin;
pub mod advance;
pub mod join;
mod retry;

#[cfg(test)]
mod admin_test;

pub use admin::CreateQueueRequest;
pub use advance::{AdvanceAction, AdvanceOutcome, AdvanceRequest};
pub use join::JoinRequest;

use crate::domain::{DomainError, Queue, QueueEntry, QueueId};
use crate::error::Result;
use crate::port::{IdProvider, QueueRepository, TimeProvider, TransactionalQueueRepository};
use std::sync::Arc;

/// Queue Service
///
/// Facade over the engine use cases, wired with the injected ports. One
/// instance is shared by all callers; every operation is safe under
/// concurrent invocation because serialization happens in the record
/// store, not here.
pub struct QueueService {
    repo: Arc<dyn QueueRepository>,
    tx_repo: Arc<dyn TransactionalQueueRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl QueueService {
    pub fn new(
        repo: Arc<dyn QueueRepository>,
        tx_repo: Arc<dyn TransactionalQueueRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            tx_repo,
            id_provider,
            time_provider,
        }
    }

    /// Join a queue, assigning the next position
    pub async fn join(&self, req: JoinRequest) -> Result<QueueEntry> {
        join::execute(
            self.tx_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Complete or remove an entry
    pub async fn advance(&self, req: AdvanceRequest) -> Result<AdvanceOutcome> {
        advance::execute(self.tx_repo.as_ref(), self.time_provider.as_ref(), req).await
    }

    /// Waiting entries of a queue, ascending by position (snapshot read).
    ///
    /// Checks queue existence first so a missing queue is distinguishable
    /// from an empty one.
    pub async fn list_waiting(&self, queue_id: &str) -> Result<Vec<QueueEntry>> {
        let queue_id: QueueId = queue_id.to_string();
        self.repo
            .find_queue(&queue_id)
            .await?
            .ok_or_else(|| DomainError::QueueNotFound(queue_id.clone()))?;
        self.repo.list_waiting(&queue_id).await
    }

    /// Look up a queue by id
    pub async fn get_queue(&self, queue_id: &str) -> Result<Queue> {
        let queue_id: QueueId = queue_id.to_string();
        self.repo
            .find_queue(&queue_id)
            .await?
            .ok_or_else(|| DomainError::QueueNotFound(queue_id).into())
    }

    /// All queues, creation order
    pub async fn list_queues(&self) -> Result<Vec<Queue>> {
        self.repo.list_queues().await
    }

    /// Create a queue (caller performs the admin capability check)
    pub async fn create_queue(&self, req: CreateQueueRequest) -> Result<Queue> {
        admin::create_queue(
            self.repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Delete a queue and all its entries (caller performs the admin
    /// capability check). Returns the number of entries removed.
    pub async fn delete_queue(&self, queue_id: &str) -> Result<u64> {
        admin::delete_queue(self.tx_repo.as_ref(), queue_id).await
    }
}
