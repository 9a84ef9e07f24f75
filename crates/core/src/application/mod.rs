// Application Layer - Use Cases and Business Logic

pub mod maintenance;
pub mod queue_service;

// Re-exports
pub use maintenance::{shutdown_channel, MaintenanceScheduler, ShutdownSender, ShutdownToken};
pub use queue_service::QueueService;
