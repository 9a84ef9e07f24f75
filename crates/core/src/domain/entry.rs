// Queue Entry Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::queue::QueueId;

/// Entry ID (UUID v4)
pub type EntryId = String;

/// User identifier. Users are owned by the authentication collaborator;
/// the engine only ever handles the opaque id.
pub type UserId = String;

/// Entry status.
///
/// `Waiting` is the only status that counts toward active membership and
/// position computations. `Canceled` is part of the persisted vocabulary
/// but no engine path sets it: removal hard-deletes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Waiting,
    Completed,
    Canceled,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Waiting => write!(f, "WAITING"),
            EntryStatus::Completed => write!(f, "COMPLETED"),
            EntryStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = crate::domain::error::DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(EntryStatus::Waiting),
            "COMPLETED" => Ok(EntryStatus::Completed),
            "CANCELED" => Ok(EntryStatus::Canceled),
            other => Err(crate::domain::error::DomainError::InvalidStatus(
                other.to_string(),
            )),
        }
    }
}

/// A single user's membership record in a queue.
///
/// `position` encodes join order, not rank: it is assigned once on join and
/// never renumbered when other entries complete or leave. The user-facing
/// rank is derived by the presentation layer as the index among waiting
/// entries ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub queue_id: QueueId,
    pub user_id: UserId,
    pub position: i64,
    pub status: EntryStatus,
    pub joined_at: i64,            // epoch ms
    pub finished_at: Option<i64>,  // epoch ms, set when leaving Waiting
}

impl QueueEntry {
    /// Create a new waiting entry
    ///
    /// # Arguments
    ///
    /// * `id` - Unique entry ID (injected, not generated)
    /// * `queue_id` - Owning queue
    /// * `user_id` - Joining user
    /// * `position` - Assigned position, computed by the join use case
    /// * `joined_at` - Join timestamp in epoch ms (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        queue_id: impl Into<String>,
        user_id: impl Into<String>,
        position: i64,
        joined_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            user_id: user_id.into(),
            position,
            status: EntryStatus::Waiting,
            joined_at,
            finished_at: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == EntryStatus::Waiting
    }

    /// Transition to Completed with explicit timestamp.
    ///
    /// The position stays frozen; it no longer counts toward the queue's
    /// max-waiting-position computation.
    pub fn complete(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != EntryStatus::Waiting {
            return Err(crate::domain::error::DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: "COMPLETED".to_string(),
            });
        }
        self.status = EntryStatus::Completed;
        self.finished_at = Some(now_millis);
        Ok(())
    }
}
