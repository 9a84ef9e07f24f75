//! Maintenance tests: retention GC, stats, vacuum

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use waitline_core::application::queue_service::{AdvanceRequest, CreateQueueRequest, JoinRequest};
use waitline_core::application::QueueService;
use waitline_core::port::id_provider::UuidProvider;
use waitline_core::port::{Maintenance, MaintenanceConfig, TimeProvider};
use waitline_infra_sqlite::{create_pool, run_migrations, SqliteMaintenance, SqliteQueueRepository};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Settable clock so retention cutoffs are deterministic
struct FixedTimeProvider(AtomicI64);

impl FixedTimeProvider {
    fn new(start: i64) -> Self {
        Self(AtomicI64::new(start))
    }

    fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

struct Harness {
    service: QueueService,
    maintenance: SqliteMaintenance,
    clock: Arc<FixedTimeProvider>,
    _dir: TempDir,
}

async fn setup() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("waitline.db");
    let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let clock = Arc::new(FixedTimeProvider::new(1_000));
    let repo = Arc::new(SqliteQueueRepository::new(pool.clone()));
    let service = QueueService::new(
        repo.clone(),
        repo,
        Arc::new(UuidProvider),
        clock.clone(),
    );
    let maintenance = SqliteMaintenance::new(pool, clock.clone());

    Harness {
        service,
        maintenance,
        clock,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_gc_deletes_only_old_completed_entries() {
    let h = setup().await;

    let queue_id = h
        .service
        .create_queue(CreateQueueRequest {
            name: "Support".to_string(),
            max_capacity: None,
        })
        .await
        .unwrap()
        .id;

    for user in ["alice", "bob", "carol"] {
        h.service
            .join(JoinRequest {
                queue_id: queue_id.clone(),
                user_id: user.to_string(),
            })
            .await
            .unwrap();
    }

    // alice finishes early, bob finishes 31 days later, carol keeps waiting
    h.clock.set(2_000);
    h.service
        .advance(AdvanceRequest {
            queue_id: queue_id.clone(),
            user_id: "alice".to_string(),
            action: "complete".to_string(),
        })
        .await
        .unwrap();

    h.clock.set(2_000 + 31 * DAY_MS);
    h.service
        .advance(AdvanceRequest {
            queue_id: queue_id.clone(),
            user_id: "bob".to_string(),
            action: "complete".to_string(),
        })
        .await
        .unwrap();

    let deleted = h.maintenance.gc_completed_entries(30).await.unwrap();
    assert_eq!(deleted, 1, "only alice's entry is past the retention cutoff");

    let stats = h.maintenance.get_stats().await.unwrap();
    assert_eq!(stats.queue_count, 1);
    assert_eq!(stats.completed_entries, 1);
    assert_eq!(stats.waiting_entries, 1, "waiting entries are never collected");
}

#[tokio::test]
async fn test_stats_reflect_store_contents() {
    let h = setup().await;

    let queue_id = h
        .service
        .create_queue(CreateQueueRequest {
            name: "Pickup".to_string(),
            max_capacity: Some(10),
        })
        .await
        .unwrap()
        .id;

    h.service
        .join(JoinRequest {
            queue_id: queue_id.clone(),
            user_id: "alice".to_string(),
        })
        .await
        .unwrap();
    h.service
        .join(JoinRequest {
            queue_id,
            user_id: "bob".to_string(),
        })
        .await
        .unwrap();

    let stats = h.maintenance.get_stats().await.unwrap();
    assert_eq!(stats.queue_count, 1);
    assert_eq!(stats.waiting_entries, 2);
    assert_eq!(stats.completed_entries, 0);
    assert!(stats.db_size_bytes > 0);
}

#[tokio::test]
async fn test_full_maintenance_runs_clean_on_fresh_store() {
    let h = setup().await;

    let stats = h
        .maintenance
        .run_full_maintenance(&MaintenanceConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.queue_count, 0);
    assert_eq!(stats.waiting_entries, 0);

    // Explicit vacuum on a fresh database reclaims nothing but must not fail
    let reclaimed = h.maintenance.vacuum().await.unwrap();
    assert!(reclaimed >= 0.0);
}
