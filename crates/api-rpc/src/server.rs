//! JSON-RPC Server
//!
//! Serves the queue engine over TCP on localhost only; external exposure
//! is a reverse proxy's problem, not this daemon's.

use crate::handler::RpcHandler;
use crate::notify::Notifier;
use crate::types::{
    AdvanceParams, CreateQueueParams, DeleteQueueParams, JoinParams, LeaveParams, ListQueuesParams,
    ListWaitingParams, MaintenanceParams, StatsParams,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::sync::Arc;
use tracing::info;
use waitline_core::application::QueueService;
use waitline_core::port::{Maintenance, MaintenanceConfig};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9460;

/// RPC Server Configuration
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret for admin methods; None disables them entirely
    pub admin_token: Option<String>,
    pub maintenance_config: MaintenanceConfig,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            admin_token: None,
            maintenance_config: MaintenanceConfig::default(),
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        service: Arc<QueueService>,
        maintenance: Arc<dyn Maintenance>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let handler = Arc::new(RpcHandler::new(
            service,
            maintenance,
            config.maintenance_config.clone(),
            notifier,
            config.admin_token.clone(),
        ));
        Self { config, handler }
    }

    /// Start the JSON-RPC server
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server on TCP (localhost only)"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("queue.join.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JoinParams = params.parse()?;
                    handler.join(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.advance.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: AdvanceParams = params.parse()?;
                    handler.advance(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.leave.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LeaveParams = params.parse()?;
                    handler.leave(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ListWaitingParams = params.parse()?;
                    handler.list_waiting(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.create.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CreateQueueParams = params.parse()?;
                    handler.create_queue(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.delete.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: DeleteQueueParams = params.parse()?;
                    handler.delete_queue(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queues.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ListQueuesParams = params.parse().unwrap_or(ListQueuesParams {});
                    handler.list_queues(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Admin APIs
        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StatsParams = params.parse()?;
                    handler.stats(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.maintenance.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: MaintenanceParams = params.parse()?;
                    handler.maintenance(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!("JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(handle)
    }
}
