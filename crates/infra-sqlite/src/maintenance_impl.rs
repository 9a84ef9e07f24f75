// SQLite Maintenance Implementation
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;
use waitline_core::domain::EntryStatus;
use waitline_core::error::{AppError, Result};
use waitline_core::port::{Maintenance, MaintenanceStats, TimeProvider};

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Get DB size in bytes from page accounting
    async fn get_db_size_bytes(&self) -> Result<i64> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page size: {}", e)))?;

        Ok(page_count * page_size)
    }

    async fn count_entries(&self, status: EntryStatus) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<f64> {
        info!("Running VACUUM to optimize database...");

        let size_before = self.get_db_size_bytes().await? as f64 / (1024.0 * 1024.0);

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("VACUUM failed: {}", e)))?;

        let size_after = self.get_db_size_bytes().await? as f64 / (1024.0 * 1024.0);
        let reclaimed = (size_before - size_after).max(0.0);

        info!(
            size_before_mb = size_before,
            size_after_mb = size_after,
            reclaimed_mb = reclaimed,
            "VACUUM completed"
        );

        Ok(reclaimed)
    }

    async fn gc_completed_entries(&self, retention_days: i64) -> Result<i64> {
        let now = self.time_provider.now_millis();
        let retention_ms = retention_days * 24 * 60 * 60 * 1000;
        let cutoff_time = now - retention_ms;

        info!(
            retention_days = retention_days,
            cutoff_time = cutoff_time,
            "Running completed entry GC"
        );

        // Only completed history is eligible; waiting entries are live state
        let result = sqlx::query(
            r#"
            DELETE FROM queue_entries
            WHERE status = ?
            AND finished_at IS NOT NULL
            AND finished_at < ?
            "#,
        )
        .bind(EntryStatus::Completed.to_string())
        .bind(cutoff_time)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Entry GC failed: {}", e)))?;

        let deleted = result.rows_affected() as i64;

        info!(deleted_entries = deleted, "Completed entry GC done");

        Ok(deleted)
    }

    async fn get_stats(&self) -> Result<MaintenanceStats> {
        let db_size_bytes = self.get_db_size_bytes().await?;

        let queue_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queues")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(MaintenanceStats {
            db_size_mb: db_size_bytes as f64 / (1024.0 * 1024.0),
            db_size_bytes,
            queue_count,
            waiting_entries: self.count_entries(EntryStatus::Waiting).await?,
            completed_entries: self.count_entries(EntryStatus::Completed).await?,
        })
    }
}
