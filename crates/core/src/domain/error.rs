// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    #[error("No entry for user {user_id} in queue {queue_id}")]
    EntryNotFound { queue_id: String, user_id: String },

    #[error("User {user_id} is already waiting in queue {queue_id}")]
    AlreadyQueued { queue_id: String, user_id: String },

    #[error("Queue {queue_id} is at capacity ({max_capacity})")]
    QueueFull { queue_id: String, max_capacity: i64 },

    #[error("Invalid advance action: {0}")]
    InvalidAction(String),

    #[error("Invalid entry status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid entry status: {0}")]
    InvalidStatus(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
