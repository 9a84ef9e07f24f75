// Queue Domain Model

use serde::{Deserialize, Serialize};

/// Queue identifier (UUID v4)
pub type QueueId = String;

/// A named waiting line.
///
/// `max_capacity` bounds the number of *simultaneously waiting* entries;
/// queues created without it accept joins without limit. Completed entries
/// never count toward the bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub id: QueueId,
    pub name: String,
    pub max_capacity: Option<i64>,
    pub created_at: i64, // epoch ms
}

impl Queue {
    /// Create a new Queue
    ///
    /// # Arguments
    ///
    /// * `id` - Unique queue ID (injected, not generated)
    /// * `name` - Display name, already validated by the caller
    /// * `max_capacity` - Optional bound on waiting entries
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        max_capacity: Option<i64>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_capacity,
            created_at,
        }
    }
}
