// Domain Layer - Pure business logic and entities

pub mod entry;
pub mod error;
pub mod queue;

// Re-exports
pub use entry::{EntryId, EntryStatus, QueueEntry, UserId};
pub use error::DomainError;
pub use queue::{Queue, QueueId};
