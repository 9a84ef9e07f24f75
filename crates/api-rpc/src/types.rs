//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};
use waitline_core::domain::{Queue, QueueEntry};

/// Entry as shown to callers. `rank` is the 1-based ordinal among the
/// queue's currently waiting entries ordered by position - derived here,
/// never stored, and absent for non-waiting entries.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub entry_id: String,
    pub queue_id: String,
    pub user_id: String,
    pub position: i64,
    pub status: String,
    pub joined_at: i64,
    pub finished_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
}

impl EntryView {
    pub fn from_entry(entry: &QueueEntry, rank: Option<u64>) -> Self {
        Self {
            entry_id: entry.id.clone(),
            queue_id: entry.queue_id.clone(),
            user_id: entry.user_id.clone(),
            position: entry.position,
            status: entry.status.to_string(),
            joined_at: entry.joined_at,
            finished_at: entry.finished_at,
            rank,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueView {
    pub queue_id: String,
    pub name: String,
    pub max_capacity: Option<i64>,
    pub created_at: i64,
}

impl From<&Queue> for QueueView {
    fn from(queue: &Queue) -> Self {
        Self {
            queue_id: queue.id.clone(),
            name: queue.name.clone(),
            max_capacity: queue.max_capacity,
            created_at: queue.created_at,
        }
    }
}

/// queue.join.v1 - Join a queue
#[derive(Debug, Deserialize)]
pub struct JoinParams {
    pub queue_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinResponse {
    pub entry: EntryView,
}

/// queue.advance.v1 - Complete or remove an entry (admin)
#[derive(Debug, Deserialize)]
pub struct AdvanceParams {
    pub queue_id: String,
    pub user_id: String,
    /// "complete" or "remove"
    pub action: String,
    pub admin_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvanceResponse {
    pub entry: EntryView,
    /// User now at the head of the queue, if any
    pub next_user_id: Option<String>,
}

/// queue.leave.v1 - Self-service removal (no admin token)
#[derive(Debug, Deserialize)]
pub struct LeaveParams {
    pub queue_id: String,
    pub user_id: String,
}

/// queue.list.v1 - Waiting entries of a queue
#[derive(Debug, Deserialize)]
pub struct ListWaitingParams {
    pub queue_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListWaitingResponse {
    pub queue_id: String,
    pub entries: Vec<EntryView>,
}

/// queue.create.v1 - Create a queue (admin)
#[derive(Debug, Deserialize)]
pub struct CreateQueueParams {
    pub name: String,
    #[serde(default)]
    pub max_capacity: Option<i64>,
    pub admin_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateQueueResponse {
    pub queue: QueueView,
}

/// queue.delete.v1 - Delete a queue and its entries (admin)
#[derive(Debug, Deserialize)]
pub struct DeleteQueueParams {
    pub queue_id: String,
    pub admin_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteQueueResponse {
    pub queue_id: String,
    pub deleted_entries: u64,
}

/// queues.list.v1 - All queues
#[derive(Debug, Deserialize)]
pub struct ListQueuesParams {}

#[derive(Debug, Clone, Serialize)]
pub struct ListQueuesResponse {
    pub queues: Vec<QueueView>,
}

/// admin.stats.v1 - System statistics (admin)
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub admin_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub queues: i64,
    pub waiting_entries: i64,
    pub completed_entries: i64,
    pub db_size_bytes: i64,
    pub uptime_seconds: i64,
}

/// admin.maintenance.v1 - Run manual maintenance (admin)
#[derive(Debug, Deserialize)]
pub struct MaintenanceParams {
    pub admin_token: String,
    #[serde(default)]
    pub force_vacuum: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    pub entries_deleted: i64,
    pub vacuum_run: bool,
    pub db_size_before_mb: f64,
    pub db_size_after_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_contiguous_even_when_positions_have_gaps() {
        // Positions 2 and 5 remain after earlier entries left the queue
        let entries = vec![
            QueueEntry::new("e-1", "q-1", "alice", 2, 1000),
            QueueEntry::new("e-2", "q-1", "bob", 5, 2000),
        ];

        let views: Vec<EntryView> = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| EntryView::from_entry(e, Some(idx as u64 + 1)))
            .collect();

        assert_eq!(views[0].rank, Some(1));
        assert_eq!(views[0].position, 2);
        assert_eq!(views[1].rank, Some(2));
        assert_eq!(views[1].position, 5);
    }

    #[test]
    fn rank_is_omitted_from_serialized_non_waiting_entries() {
        let mut entry = QueueEntry::new("e-1", "q-1", "alice", 1, 1000);
        entry.complete(2000).unwrap();

        let view = EntryView::from_entry(&entry, None);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["status"], "COMPLETED");
        assert!(json.get("rank").is_none());
    }
}
