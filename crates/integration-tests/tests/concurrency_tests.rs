//! Concurrency and race condition tests
//!
//! All tests run against a file-backed SQLite database (WAL) so that
//! concurrent tasks really do contend across separate pool connections.

use std::collections::HashSet;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::task::JoinSet;
use waitline_core::application::queue_service::{AdvanceRequest, CreateQueueRequest, JoinRequest};
use waitline_core::application::QueueService;
use waitline_core::domain::DomainError;
use waitline_core::error::AppError;
use waitline_core::port::id_provider::UuidProvider;
use waitline_core::port::time_provider::SystemTimeProvider;
use waitline_infra_sqlite::{create_pool, run_migrations, SqliteQueueRepository};

async fn setup() -> (Arc<QueueService>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("waitline.db");
    let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let repo = Arc::new(SqliteQueueRepository::new(pool));
    let service = Arc::new(QueueService::new(
        repo.clone(),
        repo,
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
    ));
    (service, dir)
}

async fn create_queue(service: &QueueService, name: &str) -> String {
    service
        .create_queue(CreateQueueRequest {
            name: name.to_string(),
            max_capacity: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_concurrent_joins_get_distinct_contiguous_positions() {
    let (service, _dir) = setup().await;
    let queue_id = create_queue(&service, "rush").await;

    const N: usize = 10;

    let mut tasks = JoinSet::new();
    for i in 0..N {
        let service = service.clone();
        let queue_id = queue_id.clone();
        tasks.spawn(async move {
            service
                .join(JoinRequest {
                    queue_id,
                    user_id: format!("user-{}", i),
                })
                .await
        });
    }

    let mut positions = Vec::new();
    while let Some(result) = tasks.join_next().await {
        let entry = result.unwrap().expect("every join must eventually succeed");
        positions.push(entry.position);
    }

    // Exactly {1..N}: no duplicates, no gaps
    let unique: HashSet<i64> = positions.iter().copied().collect();
    assert_eq!(unique.len(), N, "positions must be pairwise distinct");
    positions.sort_unstable();
    assert_eq!(positions, (1..=N as i64).collect::<Vec<_>>());

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), N);
}

#[tokio::test]
async fn test_two_simultaneous_joins_never_share_a_position() {
    let (service, _dir) = setup().await;
    let queue_id = create_queue(&service, "pair").await;

    let (a, b) = tokio::join!(
        service.join(JoinRequest {
            queue_id: queue_id.clone(),
            user_id: "dora".to_string(),
        }),
        service.join(JoinRequest {
            queue_id: queue_id.clone(),
            user_id: "emil".to_string(),
        }),
    );

    let a = a.unwrap();
    let b = b.unwrap();

    let mut positions = vec![a.position, b.position];
    positions.sort_unstable();
    assert_eq!(positions, vec![1, 2]);
}

#[tokio::test]
async fn test_concurrent_duplicate_joins_yield_one_entry() {
    let (service, _dir) = setup().await;
    let queue_id = create_queue(&service, "dupes").await;

    let mut tasks = JoinSet::new();
    for _ in 0..4 {
        let service = service.clone();
        let queue_id = queue_id.clone();
        tasks.spawn(async move {
            service
                .join(JoinRequest {
                    queue_id,
                    user_id: "alice".to_string(),
                })
                .await
        });
    }

    let mut ok = 0;
    let mut already_queued = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => ok += 1,
            Err(AppError::Domain(DomainError::AlreadyQueued { .. })) => already_queued += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(ok, 1, "exactly one join may win");
    assert_eq!(already_queued, 3);

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), 1);
}

#[tokio::test]
async fn test_racing_removes_surface_not_found_to_the_loser() {
    let (service, _dir) = setup().await;
    let queue_id = create_queue(&service, "race").await;

    service
        .join(JoinRequest {
            queue_id: queue_id.clone(),
            user_id: "alice".to_string(),
        })
        .await
        .unwrap();

    let remove = |service: Arc<QueueService>, queue_id: String| async move {
        service
            .advance(AdvanceRequest {
                queue_id,
                user_id: "alice".to_string(),
                action: "remove".to_string(),
            })
            .await
    };

    let (first, second) = tokio::join!(
        remove(service.clone(), queue_id.clone()),
        remove(service.clone(), queue_id.clone()),
    );

    let results = [first, second];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let losses = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(AppError::Domain(DomainError::EntryNotFound { .. }))
            )
        })
        .count();

    assert_eq!(wins, 1, "exactly one remove may win");
    assert_eq!(losses, 1, "the loser reports a missing entry, not a crash");

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert!(waiting.is_empty());
}

#[tokio::test]
async fn test_joins_racing_a_completion_keep_positions_unique() {
    let (service, _dir) = setup().await;
    let queue_id = create_queue(&service, "mixed").await;

    service
        .join(JoinRequest {
            queue_id: queue_id.clone(),
            user_id: "head".to_string(),
        })
        .await
        .unwrap();

    let complete = service.advance(AdvanceRequest {
        queue_id: queue_id.clone(),
        user_id: "head".to_string(),
        action: "complete".to_string(),
    });

    let join_a = service.join(JoinRequest {
        queue_id: queue_id.clone(),
        user_id: "late-a".to_string(),
    });
    let join_b = service.join(JoinRequest {
        queue_id: queue_id.clone(),
        user_id: "late-b".to_string(),
    });

    let (complete, join_a, join_b) = tokio::join!(complete, join_a, join_b);
    complete.unwrap();
    let a = join_a.unwrap();
    let b = join_b.unwrap();

    // Whatever the interleaving, the two waiting entries never share a position
    assert_ne!(a.position, b.position);

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), 2);
    assert_ne!(waiting[0].position, waiting[1].position);
}
