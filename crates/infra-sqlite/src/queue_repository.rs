// SQLite QueueRepository Implementation

use crate::rows::{EntryRow, QueueRow};
use crate::SqliteQueueTransaction;
use async_trait::async_trait;
use sqlx::SqlitePool;
use waitline_core::domain::{EntryStatus, Queue, QueueEntry, QueueId, UserId};
use waitline_core::error::{AppError, Result};
use waitline_core::port::{QueueRepository, QueueTransaction, TransactionalQueueRepository};

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // Extract database-specific error code and message
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => {
                        // UNIQUE constraint failed. On queue_entries this is
                        // the losing side of a position or membership race;
                        // retryable, the rerun re-reads the queue state.
                        AppError::TransactionConflict(format!(
                            "unique constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "5" | "6" => {
                        // SQLITE_BUSY / SQLITE_LOCKED - concurrent writer
                        AppError::TransactionConflict(format!(
                            "database busy: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "787" | "3850" => {
                        // FOREIGN KEY constraint failed
                        AppError::Database(format!(
                            "foreign key constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "13" => {
                        // SQLITE_FULL - database or disk is full
                        AppError::Database(format!("database full: {}", db_err.message()))
                    }
                    _ => AppError::Database(format!(
                        "database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn insert_queue(&self, queue: &Queue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queues (id, name, max_capacity, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&queue.id)
        .bind(&queue.name)
        .bind(queue.max_capacity)
        .bind(queue.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_queue(&self, id: &QueueId) -> Result<Option<Queue>> {
        let row = sqlx::query_as::<_, QueueRow>("SELECT * FROM queues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Queue::from))
    }

    async fn list_queues(&self) -> Result<Vec<Queue>> {
        // rowid breaks ties between queues created in the same millisecond
        let rows = sqlx::query_as::<_, QueueRow>(
            "SELECT * FROM queues ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Queue::from).collect())
    }

    async fn find_entry(
        &self,
        queue_id: &QueueId,
        user_id: &UserId,
    ) -> Result<Option<QueueEntry>> {
        // Waiting entry wins over historical ones for the same pair
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
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn list_waiting(&self, queue_id: &QueueId) -> Result<Vec<QueueEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT * FROM queue_entries
            WHERE queue_id = ? AND status = 'WAITING'
            ORDER BY position ASC
            "#,
        )
        .bind(queue_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn count_entries_by_status(&self, status: EntryStatus) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries WHERE status = ?")
                .bind(status.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn count_queues(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queues")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

#[async_trait]
impl TransactionalQueueRepository for SqliteQueueRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteQueueTransaction::new(tx)))
    }
}
