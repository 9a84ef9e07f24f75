// SQLite Transaction Implementation

use crate::queue_repository::map_sqlx_error;
use crate::rows::{EntryRow, QueueRow};
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use waitline_core::domain::{EntryId, Queue, QueueEntry, QueueId, UserId};
use waitline_core::error::Result;
use waitline_core::port::{QueueTransaction, Transaction};

pub struct SqliteQueueTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteQueueTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteQueueTransaction<'_> {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl QueueTransaction for SqliteQueueTransaction<'_> {
    async fn find_queue(&mut self, id: &QueueId) -> Result<Option<Queue>> {
        let row = sqlx::query_as::<_, QueueRow>("SELECT * FROM queues WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Queue::from))
    }

    async fn find_waiting_entry(
        &mut self,
        queue_id: &QueueId,
        user_id: &UserId,
    ) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT * FROM queue_entries
            WHERE queue_id = ? AND user_id = ? AND status = 'WAITING'
            LIMIT 1
            "#,
        )
        .bind(queue_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn find_entry(
        &mut self,
        queue_id: &QueueId,
        user_id: &UserId,
    ) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT * FROM queue_entries
            WHERE queue_id = ? AND user_id = ?
            ORDER BY CASE WHEN status = 'WAITING' THEN 0 ELSE 1 END, joined_at DESC
            LIMIT 1
            "#,
        )
        .bind(queue_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn max_waiting_position(&mut self, queue_id: &QueueId) -> Result<Option<i64>> {
        let position: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT position FROM queue_entries
            WHERE queue_id = ? AND status = 'WAITING'
            ORDER BY position DESC
            LIMIT 1
            "#,
        )
        .bind(queue_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(position)
    }

    async fn count_waiting(&mut self, queue_id: &QueueId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queue_entries WHERE queue_id = ? AND status = 'WAITING'",
        )
        .bind(queue_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn first_waiting(&mut self, queue_id: &QueueId) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT * FROM queue_entries
            WHERE queue_id = ? AND status = 'WAITING'
            ORDER BY position ASC
            LIMIT 1
            "#,
        )
        .bind(queue_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_entries (
                id, queue_id, user_id, position, status, joined_at, finished_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.queue_id)
        .bind(&entry.user_id)
        .bind(entry.position)
        .bind(entry.status.to_string())
        .bind(entry.joined_at)
        .bind(entry.finished_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_entry(&mut self, entry: &QueueEntry) -> Result<()> {
        sqlx::query("UPDATE queue_entries SET status = ?, finished_at = ? WHERE id = ?")
            .bind(entry.status.to_string())
            .bind(entry.finished_at)
            .bind(&entry.id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete_entry(&mut self, entry_id: &EntryId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE id = ?")
            .bind(entry_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_queue_entries(&mut self, queue_id: &QueueId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE queue_id = ?")
            .bind(queue_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_queue(&mut self, queue_id: &QueueId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queues WHERE id = ?")
            .bind(queue_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
