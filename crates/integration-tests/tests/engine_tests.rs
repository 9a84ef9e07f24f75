//! End-to-end engine tests against a real SQLite record store

use std::sync::Arc;

use tempfile::TempDir;
use waitline_core::application::queue_service::{AdvanceRequest, CreateQueueRequest, JoinRequest};
use waitline_core::application::QueueService;
use waitline_core::domain::{DomainError, EntryStatus, QueueId, UserId};
use waitline_core::error::AppError;
use waitline_core::port::id_provider::UuidProvider;
use waitline_core::port::time_provider::SystemTimeProvider;
use waitline_core::port::QueueRepository;
use waitline_infra_sqlite::{create_pool, run_migrations, SqliteQueueRepository};

async fn setup() -> (QueueService, Arc<SqliteQueueRepository>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("waitline.db");
    let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let repo = Arc::new(SqliteQueueRepository::new(pool));
    let service = QueueService::new(
        repo.clone(),
        repo.clone(),
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
    );
    (service, repo, dir)
}

async fn create_queue(service: &QueueService, name: &str, max_capacity: Option<i64>) -> String {
    service
        .create_queue(CreateQueueRequest {
            name: name.to_string(),
            max_capacity,
        })
        .await
        .unwrap()
        .id
}

fn join(queue_id: &str, user_id: &str) -> JoinRequest {
    JoinRequest {
        queue_id: queue_id.to_string(),
        user_id: user_id.to_string(),
    }
}

fn advance(queue_id: &str, user_id: &str, action: &str) -> AdvanceRequest {
    AdvanceRequest {
        queue_id: queue_id.to_string(),
        user_id: user_id.to_string(),
        action: action.to_string(),
    }
}

#[tokio::test]
async fn test_join_assigns_sequential_positions() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    let a = service.join(join(&queue_id, "alice")).await.unwrap();
    let b = service.join(join(&queue_id, "bob")).await.unwrap();

    assert_eq!(a.position, 1);
    assert_eq!(b.position, 2);

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), 2);
    assert_eq!(waiting[0].user_id, "alice");
    assert_eq!(waiting[1].user_id, "bob");
}

#[tokio::test]
async fn test_duplicate_join_rejected_while_waiting() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    service.join(join(&queue_id, "alice")).await.unwrap();
    let err = service.join(join(&queue_id, "alice")).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::AlreadyQueued { .. })
    ));

    // Still exactly one waiting entry
    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), 1);
}

#[tokio::test]
async fn test_join_missing_queue() {
    let (service, _repo, _dir) = setup().await;

    let err = service.join(join("no-such-queue", "alice")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::QueueNotFound(_))
    ));
}

#[tokio::test]
async fn test_complete_retains_entry_and_freezes_position() {
    let (service, repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    service.join(join(&queue_id, "alice")).await.unwrap();
    service.join(join(&queue_id, "bob")).await.unwrap();

    let outcome = service
        .advance(advance(&queue_id, "alice", "complete"))
        .await
        .unwrap();
    assert_eq!(outcome.entry.status, EntryStatus::Completed);
    assert!(outcome.entry.finished_at.is_some());

    // Completed entry is excluded from the waiting list but still exists
    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].user_id, "bob");
    assert_eq!(waiting[0].position, 2);

    let qid: QueueId = queue_id.clone();
    let uid: UserId = "alice".to_string();
    let stored = repo.find_entry(&qid, &uid).await.unwrap().unwrap();
    assert_eq!(stored.status, EntryStatus::Completed);
    assert_eq!(stored.position, 1);
}

#[tokio::test]
async fn test_positions_are_never_compacted() {
    // Queue "Support": A -> 1, B -> 2, complete A, C joins -> 3 (not 2)
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    let a = service.join(join(&queue_id, "alice")).await.unwrap();
    let b = service.join(join(&queue_id, "bob")).await.unwrap();
    assert_eq!(a.position, 1);
    assert_eq!(b.position, 2);

    service
        .advance(advance(&queue_id, "alice", "complete"))
        .await
        .unwrap();

    let c = service.join(join(&queue_id, "carol")).await.unwrap();
    assert_eq!(c.position, 3);

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    let positions: Vec<i64> = waiting.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![2, 3]);
}

#[tokio::test]
async fn test_remove_hard_deletes_entry() {
    let (service, repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    service.join(join(&queue_id, "alice")).await.unwrap();
    service.join(join(&queue_id, "bob")).await.unwrap();

    service
        .advance(advance(&queue_id, "bob", "remove"))
        .await
        .unwrap();

    let qid: QueueId = queue_id.clone();
    let uid: UserId = "bob".to_string();
    assert!(repo.find_entry(&qid, &uid).await.unwrap().is_none());

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].user_id, "alice");
}

#[tokio::test]
async fn test_remove_missing_entry_reports_not_found() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    let err = service
        .advance(advance(&queue_id, "ghost", "remove"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::EntryNotFound { .. })
    ));
}

#[tokio::test]
async fn test_unknown_action_rejected_before_lookup() {
    let (service, _repo, _dir) = setup().await;

    // Queue does not even exist; the action check fires first
    let err = service
        .advance(advance("no-such-queue", "alice", "defer"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidAction(ref s)) if s == "defer"
    ));
}

#[tokio::test]
async fn test_double_complete_is_idempotent() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    service.join(join(&queue_id, "alice")).await.unwrap();

    let first = service
        .advance(advance(&queue_id, "alice", "complete"))
        .await
        .unwrap();
    let second = service
        .advance(advance(&queue_id, "alice", "complete"))
        .await
        .unwrap();

    assert_eq!(first.entry.status, EntryStatus::Completed);
    assert_eq!(second.entry.status, EntryStatus::Completed);
    assert_eq!(second.entry.finished_at, first.entry.finished_at);
}

#[tokio::test]
async fn test_advance_reports_new_queue_head() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    service.join(join(&queue_id, "alice")).await.unwrap();
    service.join(join(&queue_id, "bob")).await.unwrap();
    service.join(join(&queue_id, "carol")).await.unwrap();

    // Completing the head surfaces bob as next up
    let outcome = service
        .advance(advance(&queue_id, "alice", "complete"))
        .await
        .unwrap();
    assert_eq!(outcome.next_waiting.unwrap().user_id, "bob");

    // Removing from the tail leaves the head untouched
    let outcome = service
        .advance(advance(&queue_id, "carol", "remove"))
        .await
        .unwrap();
    let next = outcome.next_waiting.unwrap();
    assert_eq!(next.user_id, "bob");
    assert!(outcome.entry.position > next.position);

    // Draining the queue leaves no next
    let outcome = service
        .advance(advance(&queue_id, "bob", "remove"))
        .await
        .unwrap();
    assert!(outcome.next_waiting.is_none());
}

#[tokio::test]
async fn test_capacity_bound_on_waiting_entries() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Pickup", Some(2)).await;

    service.join(join(&queue_id, "alice")).await.unwrap();
    service.join(join(&queue_id, "bob")).await.unwrap();

    let err = service.join(join(&queue_id, "carol")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::QueueFull { max_capacity: 2, .. })
    ));

    // A removal frees a slot
    service
        .advance(advance(&queue_id, "alice", "remove"))
        .await
        .unwrap();
    let carol = service.join(join(&queue_id, "carol")).await.unwrap();
    assert_eq!(carol.position, 3);
}

#[tokio::test]
async fn test_rejoin_after_completion_allowed() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    service.join(join(&queue_id, "alice")).await.unwrap();
    service.join(join(&queue_id, "bob")).await.unwrap();
    service
        .advance(advance(&queue_id, "alice", "complete"))
        .await
        .unwrap();

    // The waiting entry is gone, so alice may join again; bob still holds 2
    let rejoined = service.join(join(&queue_id, "alice")).await.unwrap();
    assert_eq!(rejoined.position, 3);

    let waiting = service.list_waiting(&queue_id).await.unwrap();
    assert_eq!(waiting.len(), 2);
}

#[tokio::test]
async fn test_delete_queue_cascades_entries() {
    let (service, repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", None).await;

    service.join(join(&queue_id, "alice")).await.unwrap();
    service.join(join(&queue_id, "bob")).await.unwrap();
    service.join(join(&queue_id, "carol")).await.unwrap();

    let removed = service.delete_queue(&queue_id).await.unwrap();
    assert_eq!(removed, 3);

    let qid: QueueId = queue_id.clone();
    assert!(repo.find_queue(&qid).await.unwrap().is_none());

    let err = service.join(join(&queue_id, "dave")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::QueueNotFound(_))
    ));

    let err = service.list_waiting(&queue_id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::QueueNotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_missing_queue_reports_not_found() {
    let (service, _repo, _dir) = setup().await;

    let err = service.delete_queue("no-such-queue").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::QueueNotFound(_))
    ));
}

#[tokio::test]
async fn test_create_queue_validation() {
    let (service, _repo, _dir) = setup().await;

    let err = service
        .create_queue(CreateQueueRequest {
            name: "  ".to_string(),
            max_capacity: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = service
        .create_queue(CreateQueueRequest {
            name: "Support".to_string(),
            max_capacity: Some(0),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_list_queues_in_creation_order() {
    let (service, _repo, _dir) = setup().await;

    create_queue(&service, "first", None).await;
    create_queue(&service, "second", Some(10)).await;

    let queues = service.list_queues().await.unwrap();
    assert_eq!(queues.len(), 2);
    assert_eq!(queues[0].name, "first");
    assert_eq!(queues[1].name, "second");
    assert_eq!(queues[1].max_capacity, Some(10));
}

#[tokio::test]
async fn test_get_queue() {
    let (service, _repo, _dir) = setup().await;
    let queue_id = create_queue(&service, "Support", Some(5)).await;

    let queue = service.get_queue(&queue_id).await.unwrap();
    assert_eq!(queue.name, "Support");
    assert_eq!(queue.max_capacity, Some(5));

    let err = service.get_queue("no-such-queue").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::QueueNotFound(_))
    ));
}
