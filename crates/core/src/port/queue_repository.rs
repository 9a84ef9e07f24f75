// Queue Repository Port (Interface)

use crate::domain::{EntryStatus, Queue, QueueEntry, QueueId, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Queue and QueueEntry persistence.
///
/// Single-statement reads and admin mutations. Anything that has to
/// observe-then-write (position assignment, cascade deletion) goes through
/// [`crate::port::TransactionalQueueRepository`] instead.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Insert a new queue
    async fn insert_queue(&self, queue: &Queue) -> Result<()>;

    /// Find queue by ID
    async fn find_queue(&self, id: &QueueId) -> Result<Option<Queue>>;

    /// All queues, creation order
    async fn list_queues(&self) -> Result<Vec<Queue>>;

    /// Find the entry for (queue, user), any status.
    ///
    /// When the pair has entries in several statuses (a user who completed
    /// a pass and joined again), the waiting entry wins; otherwise the most
    /// recently joined.
    async fn find_entry(&self, queue_id: &QueueId, user_id: &UserId)
        -> Result<Option<QueueEntry>>;

    /// Waiting entries of a queue, ascending by position (snapshot read)
    async fn list_waiting(&self, queue_id: &QueueId) -> Result<Vec<QueueEntry>>;

    /// Count entries across all queues by status
    async fn count_entries_by_status(&self, status: EntryStatus) -> Result<i64>;

    /// Count queues
    async fn count_queues(&self) -> Result<i64>;
}
