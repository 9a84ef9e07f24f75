// Waitline Infrastructure - SQLite Adapter
// Implements: QueueRepository, TransactionalQueueRepository, Maintenance

mod connection;
mod maintenance_impl;
mod migration;
mod queue_repository;
mod rows;
mod transaction;

pub use connection::create_pool;
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use transaction::SqliteQueueTransaction;

// Note: sqlx::Error conversion lives in queue_repository::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
