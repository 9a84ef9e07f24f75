//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method: rate limiting,
//! the admin capability check, engine invocation, and notification
//! dispatch after successful mutations.

use crate::error::{throttled, to_rpc_error, unauthorized};
use crate::notify::Notifier;
use crate::rate_limiter::RateLimiter;
use crate::types::{
    AdvanceParams, AdvanceResponse, CreateQueueParams, CreateQueueResponse, DeleteQueueParams,
    DeleteQueueResponse, EntryView, JoinParams, JoinResponse, LeaveParams, ListQueuesParams,
    ListQueuesResponse, ListWaitingParams, ListWaitingResponse, MaintenanceParams,
    MaintenanceResponse, QueueView, StatsParams, StatsResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use waitline_core::application::queue_service::{
    AdvanceOutcome, AdvanceRequest, CreateQueueRequest, JoinRequest,
};
use waitline_core::application::QueueService;
use waitline_core::domain::QueueEntry;
use waitline_core::port::{Maintenance, MaintenanceConfig};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<QueueService>,
    maintenance: Arc<dyn Maintenance>,
    maintenance_config: MaintenanceConfig,
    notifier: Arc<dyn Notifier>,
    rate_limiter: RateLimiter,
    admin_token: Option<String>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        service: Arc<QueueService>,
        maintenance: Arc<dyn Maintenance>,
        maintenance_config: MaintenanceConfig,
        notifier: Arc<dyn Notifier>,
        admin_token: Option<String>,
    ) -> Self {
        // Default: 200 burst, 100 req/sec (configurable via env)
        let max_burst: u32 = std::env::var("WAITLINE_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);

        let rate_per_sec: u32 = std::env::var("WAITLINE_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self {
            service,
            maintenance,
            maintenance_config,
            notifier,
            rate_limiter: RateLimiter::new(max_burst, rate_per_sec),
            admin_token,
            start_time: std::time::Instant::now(),
        }
    }

    fn check_rate_limit(&self) -> Result<(), ErrorObjectOwned> {
        if self.rate_limiter.check() {
            Ok(())
        } else {
            Err(throttled())
        }
    }

    /// Caller-side capability check replacing the admin-only route
    /// decorator of a classic web stack.
    fn check_admin(&self, presented: &str) -> Result<(), ErrorObjectOwned> {
        match &self.admin_token {
            None => Err(unauthorized("Admin interface disabled: no admin token configured")),
            Some(expected) if presented == expected => Ok(()),
            Some(_) => Err(unauthorized("Invalid admin token")),
        }
    }

    /// Display-layer rank: 1-based index among the queue's waiting entries
    /// ordered by position. Positions have gaps; ranks never do.
    async fn rank_of(&self, entry: &QueueEntry) -> Option<u64> {
        let waiting = self.service.list_waiting(&entry.queue_id).await.ok()?;
        waiting
            .iter()
            .position(|e| e.id == entry.id)
            .map(|idx| idx as u64 + 1)
    }

    /// Fire the notifier when the mutation moved a new user to the head:
    /// the affected entry sat ahead of whoever is first now.
    async fn notify_new_head(&self, outcome: &AdvanceOutcome) {
        if let Some(next) = &outcome.next_waiting {
            if outcome.entry.position < next.position {
                self.notifier.notify_turn(next).await;
            }
        }
    }

    /// queue.join.v1
    pub async fn join(&self, params: JoinParams) -> Result<JoinResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;

        let entry = self
            .service
            .join(JoinRequest {
                queue_id: params.queue_id,
                user_id: params.user_id,
            })
            .await
            .map_err(to_rpc_error)?;

        let rank = self.rank_of(&entry).await;

        Ok(JoinResponse {
            entry: EntryView::from_entry(&entry, rank),
        })
    }

    /// queue.advance.v1
    pub async fn advance(
        &self,
        params: AdvanceParams,
    ) -> Result<AdvanceResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;
        self.check_admin(&params.admin_token)?;

        let outcome = self
            .service
            .advance(AdvanceRequest {
                queue_id: params.queue_id,
                user_id: params.user_id,
                action: params.action,
            })
            .await
            .map_err(to_rpc_error)?;

        self.notify_new_head(&outcome).await;

        Ok(AdvanceResponse {
            entry: EntryView::from_entry(&outcome.entry, None),
            next_user_id: outcome.next_waiting.map(|e| e.user_id),
        })
    }

    /// queue.leave.v1 - users may always remove themselves
    pub async fn leave(&self, params: LeaveParams) -> Result<AdvanceResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;

        let outcome = self
            .service
            .advance(AdvanceRequest {
                queue_id: params.queue_id,
                user_id: params.user_id,
                action: "remove".to_string(),
            })
            .await
            .map_err(to_rpc_error)?;

        self.notify_new_head(&outcome).await;

        Ok(AdvanceResponse {
            entry: EntryView::from_entry(&outcome.entry, None),
            next_user_id: outcome.next_waiting.map(|e| e.user_id),
        })
    }

    /// queue.list.v1
    pub async fn list_waiting(
        &self,
        params: ListWaitingParams,
    ) -> Result<ListWaitingResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;

        let entries = self
            .service
            .list_waiting(&params.queue_id)
            .await
            .map_err(to_rpc_error)?;

        let entries = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| EntryView::from_entry(entry, Some(idx as u64 + 1)))
            .collect();

        Ok(ListWaitingResponse {
            queue_id: params.queue_id,
            entries,
        })
    }

    /// queue.create.v1
    pub async fn create_queue(
        &self,
        params: CreateQueueParams,
    ) -> Result<CreateQueueResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;
        self.check_admin(&params.admin_token)?;

        let queue = self
            .service
            .create_queue(CreateQueueRequest {
                name: params.name,
                max_capacity: params.max_capacity,
            })
            .await
            .map_err(to_rpc_error)?;

        Ok(CreateQueueResponse {
            queue: QueueView::from(&queue),
        })
    }

    /// queue.delete.v1
    pub async fn delete_queue(
        &self,
        params: DeleteQueueParams,
    ) -> Result<DeleteQueueResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;
        self.check_admin(&params.admin_token)?;

        let deleted_entries = self
            .service
            .delete_queue(&params.queue_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(DeleteQueueResponse {
            queue_id: params.queue_id,
            deleted_entries,
        })
    }

    /// queues.list.v1
    pub async fn list_queues(
        &self,
        _params: ListQueuesParams,
    ) -> Result<ListQueuesResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;

        let queues = self.service.list_queues().await.map_err(to_rpc_error)?;

        Ok(ListQueuesResponse {
            queues: queues.iter().map(QueueView::from).collect(),
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self, params: StatsParams) -> Result<StatsResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;
        self.check_admin(&params.admin_token)?;

        let stats = self.maintenance.get_stats().await.map_err(to_rpc_error)?;

        Ok(StatsResponse {
            queues: stats.queue_count,
            waiting_entries: stats.waiting_entries,
            completed_entries: stats.completed_entries,
            db_size_bytes: stats.db_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    /// admin.maintenance.v1
    pub async fn maintenance(
        &self,
        params: MaintenanceParams,
    ) -> Result<MaintenanceResponse, ErrorObjectOwned> {
        self.check_rate_limit()?;
        self.check_admin(&params.admin_token)?;

        let stats_before = self.maintenance.get_stats().await.map_err(to_rpc_error)?;

        let entries_deleted = self
            .maintenance
            .gc_completed_entries(self.maintenance_config.completed_entry_retention_days)
            .await
            .map_err(to_rpc_error)?;

        let vacuum_run =
            params.force_vacuum || stats_before.db_size_mb > self.maintenance_config.max_db_size_mb;
        if vacuum_run {
            self.maintenance.vacuum().await.map_err(to_rpc_error)?;
        }

        let stats_after = self.maintenance.get_stats().await.map_err(to_rpc_error)?;

        Ok(MaintenanceResponse {
            entries_deleted,
            vacuum_run,
            db_size_before_mb: stats_before.db_size_mb,
            db_size_after_mb: stats_after.db_size_mb,
        })
    }
}
