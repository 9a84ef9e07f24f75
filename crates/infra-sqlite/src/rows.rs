// Row mapping between SQLite and domain records

use sqlx::FromRow;
use std::str::FromStr;
use waitline_core::domain::{EntryStatus, Queue, QueueEntry};
use waitline_core::error::{AppError, Result};

#[derive(FromRow)]
pub(crate) struct QueueRow {
    pub id: String,
    pub name: String,
    pub max_capacity: Option<i64>,
    pub created_at: i64,
}

impl From<QueueRow> for Queue {
    fn from(row: QueueRow) -> Self {
        Queue {
            id: row.id,
            name: row.name,
            max_capacity: row.max_capacity,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct EntryRow {
    pub id: String,
    pub queue_id: String,
    pub user_id: String,
    pub position: i64,
    pub status: String,
    pub joined_at: i64,
    pub finished_at: Option<i64>,
}

impl EntryRow {
    pub(crate) fn into_entry(self) -> Result<QueueEntry> {
        let status = EntryStatus::from_str(&self.status)
            .map_err(|e| AppError::Database(format!("corrupt status column: {}", e)))?;
        Ok(QueueEntry {
            id: self.id,
            queue_id: self.queue_id,
            user_id: self.user_id,
            position: self.position,
            status,
            joined_at: self.joined_at,
            finished_at: self.finished_at,
        })
    }
}
