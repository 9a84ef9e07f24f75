//! Notification dispatch hook
//!
//! The engine never calls notification services; after a successful
//! mutation the RPC handler hands the new queue head to this port.
//! Actual delivery (SMS/email, contact lookup) is an external
//! collaborator consuming these events.

use async_trait::async_trait;
use waitline_core::domain::QueueEntry;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// A user has reached the head of a queue
    async fn notify_turn(&self, entry: &QueueEntry);
}

/// Log-backed notifier: emits a structured event for an out-of-process
/// dispatcher to pick up.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_turn(&self, entry: &QueueEntry) {
        tracing::info!(
            queue_id = %entry.queue_id,
            user_id = %entry.user_id,
            position = entry.position,
            "User reached the head of the queue"
        );
    }
}
