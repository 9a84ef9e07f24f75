//! Waitline - Main Entry Point
//! JSON-RPC server + background maintenance over a SQLite record store

mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use waitline_api_rpc::{LogNotifier, RpcServer, RpcServerConfig};
use waitline_core::application::{shutdown_channel, MaintenanceScheduler, QueueService};
use waitline_core::port::id_provider::UuidProvider;
use waitline_core::port::time_provider::SystemTimeProvider;
use waitline_core::port::MaintenanceConfig;
use waitline_infra_sqlite::{create_pool, run_migrations, SqliteMaintenance, SqliteQueueRepository};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.waitline/queues.db";
const MAINTENANCE_INTERVAL_HOURS: u64 = 24;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON format for production)
    let log_format = std::env::var("WAITLINE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,sqlx=warn"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Waitline v{} starting...", VERSION);

    // 1.1. Initialize OpenTelemetry (optional)
    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration
    let db_path = std::env::var("WAITLINE_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

    let rpc_port: u16 = std::env::var("WAITLINE_RPC_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9460);

    let admin_token = std::env::var("WAITLINE_ADMIN_TOKEN").ok();
    if admin_token.is_none() {
        tracing::warn!("WAITLINE_ADMIN_TOKEN not set; admin methods are disabled");
    }

    let retention_days: i64 = std::env::var("WAITLINE_RETENTION_DAYS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| MaintenanceConfig::default().completed_entry_retention_days);

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let repo = Arc::new(SqliteQueueRepository::new(pool.clone()));

    let service = Arc::new(QueueService::new(
        repo.clone(),
        repo.clone(),
        id_provider,
        time_provider.clone(),
    ));

    let maintenance = Arc::new(SqliteMaintenance::new(pool.clone(), time_provider));
    let maintenance_config = MaintenanceConfig {
        completed_entry_retention_days: retention_days,
        ..MaintenanceConfig::default()
    };

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: rpc_port,
        admin_token,
        maintenance_config: maintenance_config.clone(),
        ..Default::default()
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        service,
        maintenance.clone(),
        Arc::new(LogNotifier),
    );
    let rpc_handle = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 6. Start maintenance scheduler
    info!("Starting maintenance scheduler...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let scheduler = MaintenanceScheduler::new(
        maintenance,
        maintenance_config,
        MAINTENANCE_INTERVAL_HOURS,
    );

    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    });

    info!("System ready. Waiting for requests...");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), scheduler_handle).await;

    info!("Shutdown complete.");

    Ok(())
}
