// Transaction port for atomic operations

use crate::domain::{EntryId, Queue, QueueEntry, QueueId, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional QueueRepository operations
#[async_trait]
pub trait TransactionalQueueRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>>;
}

/// Statements available within a queue transaction.
///
/// The max-position-then-insert sequence of `join` runs entirely through
/// one of these, so the store can serialize concurrent joins to the same
/// queue. A lost race surfaces as `AppError::TransactionConflict`.
#[async_trait]
pub trait QueueTransaction: Transaction {
    /// Find queue by ID (within transaction)
    async fn find_queue(&mut self, id: &QueueId) -> Result<Option<Queue>>;

    /// Find the waiting entry for (queue, user), if any
    async fn find_waiting_entry(
        &mut self,
        queue_id: &QueueId,
        user_id: &UserId,
    ) -> Result<Option<QueueEntry>>;

    /// Find the entry for (queue, user), any status; waiting preferred,
    /// then most recently joined
    async fn find_entry(&mut self, queue_id: &QueueId, user_id: &UserId)
        -> Result<Option<QueueEntry>>;

    /// Highest position among waiting entries of the queue, None when empty
    async fn max_waiting_position(&mut self, queue_id: &QueueId) -> Result<Option<i64>>;

    /// Number of waiting entries in the queue
    async fn count_waiting(&mut self, queue_id: &QueueId) -> Result<i64>;

    /// Lowest-position waiting entry of the queue (the current head)
    async fn first_waiting(&mut self, queue_id: &QueueId) -> Result<Option<QueueEntry>>;

    /// Insert entry (within transaction)
    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()>;

    /// Persist a status transition
    async fn update_entry(&mut self, entry: &QueueEntry) -> Result<()>;

    /// Hard-delete an entry; returns affected row count
    async fn delete_entry(&mut self, entry_id: &EntryId) -> Result<u64>;

    /// Delete all entries of a queue; returns affected row count
    async fn delete_queue_entries(&mut self, queue_id: &QueueId) -> Result<u64>;

    /// Delete the queue record itself; returns affected row count
    async fn delete_queue(&mut self, queue_id: &QueueId) -> Result<u64>;
}
